//! Shared error type across lapse crates.

use thiserror::Error;

use crate::trace::TraceId;

/// Stable error kinds (used in logs and by callers that match on category).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Trace id not present in the registry.
    NotFound,
    /// Trace was already stamped with an end time.
    AlreadyCompleted,
    /// Report delivery failed.
    Sink,
    /// Invalid configuration.
    Config,
    /// Internal error.
    Internal,
}

impl ErrorKind {
    /// String representation used in structured log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::AlreadyCompleted => "ALREADY_COMPLETED",
            ErrorKind::Sink => "SINK",
            ErrorKind::Config => "CONFIG",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, LapseError>;

/// Unified error type used by core and collector.
#[derive(Debug, Error)]
pub enum LapseError {
    #[error("trace not found: {0}")]
    NotFound(TraceId),
    #[error("trace already completed: {0}")]
    AlreadyCompleted(TraceId),
    #[error("sink delivery failed: {0}")]
    Sink(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl LapseError {
    /// Map the error to its stable kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LapseError::NotFound(_) => ErrorKind::NotFound,
            LapseError::AlreadyCompleted(_) => ErrorKind::AlreadyCompleted,
            LapseError::Sink(_) => ErrorKind::Sink,
            LapseError::Config(_) => ErrorKind::Config,
            LapseError::Internal(_) => ErrorKind::Internal,
        }
    }
}
