//! Error types for backend queries

use std::fmt;

/// Result type alias for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors that can occur while querying the metrics source
///
/// The taxonomy matters to the sampling loop: `Parse` is the recoverable
/// per-channel condition, everything else indicates the source itself is
/// misbehaving. All variants are plain data so tests can clone scripted
/// errors.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The backend returned data that could not be read as a finite number
    Parse(String),

    /// The backend could not be reached (connect, timeout, transport)
    Transport(String),

    /// The backend answered with a non-success HTTP status
    Status(u16),

    /// The backend does not know the queried channel
    UnknownChannel(String),
}

impl BackendError {
    /// Whether this is a parse failure, the recoverable per-channel class.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, BackendError::Parse(_))
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Parse(msg) => write!(f, "unparseable backend data: {}", msg),
            BackendError::Transport(msg) => write!(f, "backend unreachable: {}", msg),
            BackendError::Status(code) => write!(f, "backend returned HTTP {}", code),
            BackendError::UnknownChannel(name) => {
                write!(f, "backend does not know channel '{}'", name)
            }
        }
    }
}

impl std::error::Error for BackendError {}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => BackendError::Status(status.as_u16()),
            None => BackendError::Transport(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Parse(err.to_string())
    }
}
