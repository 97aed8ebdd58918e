//! Process-wide counters of written service messages.
//!
//! The listener records every message it manages to write; [`Metrics::flush`]
//! logs the totals once at the end of a run.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::message::MessageType;

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    messages_written: AtomicU64,
    failures_reported: AtomicU64,
    tests_ignored: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub messages_written: u64,
    /// `testFailed` lines, whether from errors, failures or warnings
    pub failures_reported: u64,
    /// `testIgnored` lines (skipped, incomplete and risky tests)
    pub tests_ignored: u64,
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            messages_written: AtomicU64::new(0),
            failures_reported: AtomicU64::new(0),
            tests_ignored: AtomicU64::new(0),
        }
    }

    /// Count one message of `kind` that reached the sink.
    pub fn record(&self, kind: MessageType) {
        self.messages_written.fetch_add(1, Ordering::Relaxed);
        let outcome = match kind {
            MessageType::TestFailed => &self.failures_reported,
            MessageType::TestIgnored => &self.tests_ignored,
            _ => return,
        };
        outcome.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_written: self.messages_written.load(Ordering::Relaxed),
            failures_reported: self.failures_reported.load(Ordering::Relaxed),
            tests_ignored: self.tests_ignored.load(Ordering::Relaxed),
        }
    }

    /// Log the current totals as one `info!` event. Counters are not reset.
    pub fn flush(&self) {
        let snapshot = self.snapshot();
        tracing::info!(
            metric = "reporter_counters",
            messages_written = snapshot.messages_written,
            failures_reported = snapshot.failures_reported,
            tests_ignored = snapshot.tests_ignored,
        );
    }
}
