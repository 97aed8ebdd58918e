//! Failure payloads and the `testFailed` detail derived from them.
//!
//! A [`Failure`] is the engine-agnostic carrier for whatever went wrong in a
//! test: its kind, message text, stack frames and, for comparison-style
//! assertions, the expected/actual renderings. [`FailureDetail`] is what the
//! listener actually puts on the wire.

use serde::{Deserialize, Serialize};

use crate::diff::render_diff;
use crate::escape::trim_value;
use crate::Result;

/// Message `type` attribute value for comparison failures.
pub const COMPARISON_FAILURE: &str = "comparisonFailure";

/// What kind of failure was reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    /// Unexpected error, rendered as `<class>: <message>`.
    Error { class: String },
    /// Assertion failure, rendered as the bare message.
    AssertionFailed,
    /// Non-fatal warning, rendered as the bare message.
    Warning,
}

/// One stack frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub file: String,
    pub line: u32,
}

impl Frame {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Expected/actual renderings attached to a comparison assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub expected: String,
    pub actual: String,
}

impl Comparison {
    pub fn new(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Render both sides with pretty `Debug`.
    pub fn from_debug<E: std::fmt::Debug, A: std::fmt::Debug>(expected: &E, actual: &A) -> Self {
        Self::new(format!("{:#?}", expected), format!("{:#?}", actual))
    }

    /// Render both sides as pretty-printed JSON.
    pub fn from_json<E: Serialize, A: Serialize>(expected: &E, actual: &A) -> Result<Self> {
        Ok(Self::new(
            serde_json::to_string_pretty(expected)?,
            serde_json::to_string_pretty(actual)?,
        ))
    }

    /// Unified diff block, leading newline included.
    pub fn diff(&self) -> String {
        render_diff(&self.expected, &self.actual)
    }
}

/// A failure reported by the test engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    #[serde(flatten)]
    pub kind: FailureKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<Frame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
}

impl Failure {
    pub fn error(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_kind(
            FailureKind::Error {
                class: class.into(),
            },
            message,
        )
    }

    pub fn assertion(message: impl Into<String>) -> Self {
        Self::with_kind(FailureKind::AssertionFailed, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_kind(FailureKind::Warning, message)
    }

    fn with_kind(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            trace: Vec::new(),
            comparison: None,
        }
    }

    pub fn with_trace(mut self, trace: Vec<Frame>) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = Some(comparison);
        self
    }

    /// Human-readable rendering: kind prefix, message, then the diff for
    /// comparison failures. Surrounding whitespace is trimmed.
    pub fn render(&self) -> String {
        let mut buffer = match &self.kind {
            FailureKind::Error { class } => format!("{}: {}", class, self.message),
            FailureKind::AssertionFailed | FailureKind::Warning => self.message.clone(),
        };
        if let Some(comparison) = &self.comparison {
            buffer.push_str(&comparison.diff());
        }
        trim_value(&buffer).to_string()
    }
}

/// Drops toolchain and dependency frames from stack traces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFilter {
    markers: Vec<String>,
}

impl Default for StackFilter {
    fn default() -> Self {
        Self::new(
            ["/rustc/", "/.cargo/registry/", "/library/std/", "/library/core/"]
                .into_iter()
                .map(String::from),
        )
    }
}

impl StackFilter {
    pub fn new(markers: impl IntoIterator<Item = String>) -> Self {
        Self {
            markers: markers.into_iter().collect(),
        }
    }

    /// No filtering at all.
    pub fn none() -> Self {
        Self {
            markers: Vec::new(),
        }
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.markers.push(marker.into());
        self
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    fn is_excluded(&self, frame: &Frame) -> bool {
        self.markers.iter().any(|m| frame.file.contains(m.as_str()))
    }

    /// Render surviving frames as `file:line` lines.
    ///
    /// If every frame would be filtered out the full trace is kept, so a
    /// genuine error never reports empty details.
    pub fn render(&self, trace: &[Frame]) -> String {
        let kept: Vec<&Frame> = trace.iter().filter(|f| !self.is_excluded(f)).collect();
        let frames: Vec<&Frame> = if kept.is_empty() {
            trace.iter().collect()
        } else {
            kept
        };
        frames.iter().map(|f| format!("{}\n", f)).collect()
    }
}

/// Parameters of a `testFailed` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDetail {
    pub message: String,
    pub details: String,
    pub comparison: Option<Comparison>,
}

impl FailureDetail {
    pub fn from_failure(failure: &Failure, filter: &StackFilter) -> Self {
        Self {
            message: failure.render(),
            details: filter.render(&failure.trace),
            comparison: failure.comparison.clone(),
        }
    }

    /// Explicit params in emission order.
    pub fn into_params(self) -> Vec<(&'static str, String)> {
        let mut params = vec![("message", self.message), ("details", self.details)];
        if let Some(comparison) = self.comparison {
            params.push(("type", COMPARISON_FAILURE.to_string()));
            params.push(("expected", comparison.expected));
            params.push(("actual", comparison.actual));
        }
        params
    }
}
