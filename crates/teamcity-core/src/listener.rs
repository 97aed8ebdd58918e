//! Test lifecycle listener emitting TeamCity service messages.
//!
//! [`TestListener`] is the seam the host test engine drives: one call per
//! lifecycle event, in the order the events happen. [`TeamCityListener`]
//! implements it by encoding exactly one message per call and appending it
//! to its sink. No state is kept between calls, so the output order is the
//! call order.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ListenerConfig;
use crate::failure::{Failure, FailureDetail, StackFilter};
use crate::message::{MessageEncoder, MessageType};
use crate::metrics::METRICS;
use crate::obs;
use crate::subject::{Subject, TestSuite};
use crate::timestamp::Clock;
use crate::Result;

/// Value of `captureStandardOutput` on `testStarted`: output printed between
/// start and finish is attributed to the test.
pub const CAPTURE_STANDARD_OUTPUT: &str = "true";

/// Payload of a non-fatal warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Warning {
    /// Warning raised as a full failure value; reported like an error.
    Failure(Failure),
    /// Plain warning text; reported without details.
    Message(String),
}

/// Receives test lifecycle events from a test engine.
///
/// The engine guarantees pairing: every `start_test_suite` has a matching
/// `end_test_suite`, and at most one outcome call is made per test.
pub trait TestListener {
    fn start_test_suite(&mut self, suite: &TestSuite) -> Result<()>;

    fn end_test_suite(&mut self, suite: &TestSuite) -> Result<()>;

    fn start_test(&mut self, test: &Subject) -> Result<()>;

    fn end_test(&mut self, test: &Subject, elapsed: Duration) -> Result<()>;

    /// An unexpected error escaped the test.
    fn add_error(&mut self, test: &Subject, failure: &Failure) -> Result<()>;

    /// An assertion failed.
    fn add_failure(&mut self, test: &Subject, failure: &Failure) -> Result<()>;

    fn add_warning(&mut self, test: &Subject, warning: &Warning) -> Result<()>;

    fn add_skipped_test(&mut self, test: &Subject, message: &str) -> Result<()>;

    fn add_incomplete_test(&mut self, test: &Subject, message: &str) -> Result<()>;

    fn add_risky_test(&mut self, test: &Subject, message: &str) -> Result<()>;
}

/// Writes one TeamCity service message per lifecycle event to `W`.
#[derive(Debug)]
pub struct TeamCityListener<W: Write> {
    sink: W,
    encoder: MessageEncoder,
    stack_filter: StackFilter,
}

impl<W: Write> TeamCityListener<W> {
    pub fn new(sink: W, config: ListenerConfig) -> Self {
        Self {
            sink,
            encoder: MessageEncoder::new(config.flow_id),
            stack_filter: config.stack_filter,
        }
    }

    /// Use a custom clock for timestamps (fixed clocks make output reproducible).
    pub fn with_clock(sink: W, config: ListenerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            sink,
            encoder: MessageEncoder::with_clock(config.flow_id, clock),
            stack_filter: config.stack_filter,
        }
    }

    pub fn encoder(&self) -> &MessageEncoder {
        &self.encoder
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    /// Release the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }

    fn write_message<K, V>(
        &mut self,
        kind: MessageType,
        subject: &Subject,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> Result<()>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let line = self.encoder.encode(kind, subject, params);

        if let Err(e) = self
            .sink
            .write_all(line.as_bytes())
            .and_then(|_| self.sink.flush())
        {
            obs::emit_sink_error(kind, &e);
            return Err(e.into());
        }

        METRICS.record(kind);
        obs::emit_message_written(kind, subject);
        Ok(())
    }

    fn write_failure(&mut self, test: &Subject, failure: &Failure) -> Result<()> {
        let detail = FailureDetail::from_failure(failure, &self.stack_filter);
        self.write_message(MessageType::TestFailed, test, detail.into_params())
    }

    fn write_ignored(&mut self, test: &Subject, message: &str) -> Result<()> {
        self.write_message(MessageType::TestIgnored, test, [("message", message)])
    }
}

impl<W: Write> TestListener for TeamCityListener<W> {
    fn start_test_suite(&mut self, suite: &TestSuite) -> Result<()> {
        let subject = Subject::Suite(suite.clone());
        self.write_message(MessageType::TestSuiteStarted, &subject, NO_PARAMS)
    }

    fn end_test_suite(&mut self, suite: &TestSuite) -> Result<()> {
        let subject = Subject::Suite(suite.clone());
        self.write_message(MessageType::TestSuiteFinished, &subject, NO_PARAMS)
    }

    fn start_test(&mut self, test: &Subject) -> Result<()> {
        self.write_message(
            MessageType::TestStarted,
            test,
            [("captureStandardOutput", CAPTURE_STANDARD_OUTPUT)],
        )
    }

    fn end_test(&mut self, test: &Subject, elapsed: Duration) -> Result<()> {
        let duration = elapsed.as_millis().to_string();
        self.write_message(MessageType::TestFinished, test, [("duration", duration)])
    }

    fn add_error(&mut self, test: &Subject, failure: &Failure) -> Result<()> {
        self.write_failure(test, failure)
    }

    fn add_failure(&mut self, test: &Subject, failure: &Failure) -> Result<()> {
        self.write_failure(test, failure)
    }

    fn add_warning(&mut self, test: &Subject, warning: &Warning) -> Result<()> {
        match warning {
            Warning::Failure(failure) => self.write_failure(test, failure),
            Warning::Message(message) => {
                self.write_message(MessageType::TestFailed, test, [("message", message.as_str())])
            }
        }
    }

    fn add_skipped_test(&mut self, test: &Subject, message: &str) -> Result<()> {
        self.write_ignored(test, message)
    }

    fn add_incomplete_test(&mut self, test: &Subject, message: &str) -> Result<()> {
        self.write_ignored(test, message)
    }

    fn add_risky_test(&mut self, test: &Subject, message: &str) -> Result<()> {
        self.write_ignored(test, message)
    }
}

const NO_PARAMS: [(&str, &str); 0] = [];

/// Convert fractional seconds (as reported by most engines) into whole
/// milliseconds, rounding down.
///
/// Negative or non-finite input yields zero; overflow saturates.
pub fn elapsed_from_secs(secs: f64) -> Duration {
    if !secs.is_finite() || secs <= 0.0 {
        return Duration::ZERO;
    }
    // float-to-int `as` saturates at u64::MAX
    Duration::from_millis((secs * 1000.0).floor() as u64)
}
