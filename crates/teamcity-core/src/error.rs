//! Error types for reporter operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReporterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read lifecycle event on line {line}: {source}")]
    ReadEvent {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("malformed lifecycle event on line {line}: {source}")]
    MalformedEvent {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown message type: {0}")]
    UnknownMessageType(String),

    #[error("invalid flow id: {0}")]
    InvalidFlowId(String),
}

/// Result type for reporter operations
pub type Result<T> = std::result::Result<T, ReporterError>;
