//! Serializable test lifecycle events.
//!
//! A run can be recorded as JSON lines, one [`LifecycleEvent`] per line, and
//! replayed later through any [`TestListener`]. Each event maps to exactly
//! one listener call, so replaying a log yields the same message stream as
//! driving the listener directly.

use std::io::BufRead;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::failure::Failure;
use crate::listener::{elapsed_from_secs, TestListener, Warning};
use crate::obs;
use crate::subject::{Subject, TestSuite};
use crate::{ReporterError, Result};

/// One lifecycle notification from a test engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    SuiteStarted {
        suite: TestSuite,
    },
    SuiteFinished {
        suite: TestSuite,
    },
    TestStarted {
        test: Subject,
    },
    TestFinished {
        test: Subject,
        /// Whole milliseconds; preferred over `duration_secs` when both are set
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_ms: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_secs: Option<f64>,
    },
    TestFailed {
        test: Subject,
        failure: Failure,
    },
    TestErrored {
        test: Subject,
        failure: Failure,
    },
    TestWarning {
        test: Subject,
        warning: Warning,
    },
    TestSkipped {
        test: Subject,
        message: String,
    },
    TestIncomplete {
        test: Subject,
        message: String,
    },
    TestRisky {
        test: Subject,
        message: String,
    },
}

impl LifecycleEvent {
    /// Event name as it appears in the `event` tag.
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::SuiteStarted { .. } => "suite_started",
            LifecycleEvent::SuiteFinished { .. } => "suite_finished",
            LifecycleEvent::TestStarted { .. } => "test_started",
            LifecycleEvent::TestFinished { .. } => "test_finished",
            LifecycleEvent::TestFailed { .. } => "test_failed",
            LifecycleEvent::TestErrored { .. } => "test_errored",
            LifecycleEvent::TestWarning { .. } => "test_warning",
            LifecycleEvent::TestSkipped { .. } => "test_skipped",
            LifecycleEvent::TestIncomplete { .. } => "test_incomplete",
            LifecycleEvent::TestRisky { .. } => "test_risky",
        }
    }

    /// Forward this event to the matching listener call.
    pub fn dispatch<L: TestListener + ?Sized>(&self, listener: &mut L) -> Result<()> {
        match self {
            LifecycleEvent::SuiteStarted { suite } => listener.start_test_suite(suite),
            LifecycleEvent::SuiteFinished { suite } => listener.end_test_suite(suite),
            LifecycleEvent::TestStarted { test } => listener.start_test(test),
            LifecycleEvent::TestFinished {
                test,
                duration_ms,
                duration_secs,
            } => {
                let elapsed = duration_ms
                    .map(Duration::from_millis)
                    .or_else(|| duration_secs.map(elapsed_from_secs))
                    .unwrap_or_default();
                listener.end_test(test, elapsed)
            }
            LifecycleEvent::TestFailed { test, failure } => listener.add_failure(test, failure),
            LifecycleEvent::TestErrored { test, failure } => listener.add_error(test, failure),
            LifecycleEvent::TestWarning { test, warning } => listener.add_warning(test, warning),
            LifecycleEvent::TestSkipped { test, message } => {
                listener.add_skipped_test(test, message)
            }
            LifecycleEvent::TestIncomplete { test, message } => {
                listener.add_incomplete_test(test, message)
            }
            LifecycleEvent::TestRisky { test, message } => listener.add_risky_test(test, message),
        }
    }
}

/// Replay a JSON-lines event log through `listener`.
///
/// Blank lines are skipped. Stops at the first unreadable or malformed line,
/// or at a sink error; messages already written stay valid. Returns the
/// number of events dispatched.
pub fn replay<R: BufRead, L: TestListener + ?Sized>(reader: R, listener: &mut L) -> Result<usize> {
    let start = Instant::now();
    let mut dispatched = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| ReporterError::ReadEvent {
            line: index + 1,
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let event: LifecycleEvent =
            serde_json::from_str(&line).map_err(|source| ReporterError::MalformedEvent {
                line: index + 1,
                source,
            })?;
        event.dispatch(listener)?;
        dispatched += 1;
    }

    obs::emit_run_replayed(dispatched, start.elapsed().as_millis() as u64);
    Ok(dispatched)
}
