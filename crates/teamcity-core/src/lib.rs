//! TeamCity Test Reporter Core
//!
//! Translates test lifecycle events into TeamCity service messages:
//! - `MessageEncoder`: one escaped `##teamcity[...]` line per message, with
//!   derived `name`, `timestamp` and `flowId` attributes
//! - `TestListener` / `TeamCityListener`: maps suite and test events (start,
//!   finish, failure, error, warning, skip, incomplete, risky) onto messages
//! - `Subject`: tests, suites and self-describing tests, and how they are named
//! - `Failure` / `FailureDetail`: failure rendering, stack filtering and
//!   comparison diffs
//! - `LifecycleEvent` / `replay`: JSON-lines run logs driven through a listener
//!
//! The listener writes synchronously to a single sink. The line order in the
//! sink is exactly the order of the calls it received.

pub mod config;
pub mod diff;
pub mod error;
pub mod escape;
pub mod events;
pub mod failure;
pub mod listener;
pub mod message;
pub mod metrics;
pub mod obs;
pub mod subject;
pub mod telemetry;
pub mod timestamp;

pub use config::{FlowId, ListenerConfig, FLOW_ID_ENV, STACK_FILTER_ENV};
pub use error::{ReporterError, Result};
pub use escape::escape_value;
pub use events::{replay, LifecycleEvent};
pub use failure::{
    Comparison, Failure, FailureDetail, FailureKind, Frame, StackFilter, COMPARISON_FAILURE,
};
pub use listener::{
    elapsed_from_secs, TeamCityListener, TestListener, Warning, CAPTURE_STANDARD_OUTPUT,
};
pub use message::{MessageEncoder, MessageType, ServiceMessage, MESSAGE_PREFIX};
pub use metrics::METRICS;
pub use obs::{emit_message_written, emit_run_replayed, emit_sink_error, RunSpan};
pub use subject::{derive_name, DataSet, Subject, TestCase, TestSuite};
pub use telemetry::init_tracing;
pub use timestamp::{format_timestamp, Clock, FixedClock, SystemClock, TIMESTAMP_FORMAT};

/// Reporter version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
