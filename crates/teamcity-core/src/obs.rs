//! Structured observability hooks for reporter activity.
//!
//! This module provides:
//! - Run-scoped tracing spans via `RunSpan` RAII guard
//! - Emission functions for message writes, sink failures and replay completion
//!
//! Diagnostics go through `tracing` only; they never touch the message sink.

use tracing::{debug, info, warn};

use crate::config::FlowId;
use crate::message::MessageType;
use crate::subject::{derive_name, Subject};

/// RAII guard that enters a run-scoped tracing span for the duration of a run.
///
/// # Example
///
/// ```ignore
/// let _span = RunSpan::enter(FlowId(24107));
/// // every message written now carries flow_id = 24107
/// ```
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    /// Create and enter a span tagged with the flow id.
    pub fn enter(flow_id: FlowId) -> Self {
        let span = tracing::info_span!("teamcity.run", flow_id = %flow_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: one service message appended to the sink.
pub fn emit_message_written(kind: MessageType, subject: &Subject) {
    debug!(
        event = "message.written",
        kind = %kind,
        name = %derive_name(subject),
    );
}

/// Emit event: writing to the sink failed (warning level).
pub fn emit_sink_error(kind: MessageType, error: &dyn std::fmt::Display) {
    warn!(event = "message.sink_error", kind = %kind, error = %error);
}

/// Emit event: a recorded run log was replayed.
pub fn emit_run_replayed(events: usize, duration_ms: u64) {
    info!(event = "run.replayed", events = events, duration_ms = duration_ms);
}
