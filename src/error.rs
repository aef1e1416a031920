//! Error types

use thiserror::Error;

/// Boxed error used at the callback and limiter seams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration (bad URL, bad TLS material, contradictory pool sizes)
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings document could not be decoded
    #[error("invalid settings document: {0}")]
    Json(#[from] serde_json::Error),

    /// The limiter refused the operation
    #[error("operation denied by limiter: {0}")]
    LimiterDenied(#[source] BoxError),

    /// An admitted operation finished without reporting a result
    #[error("admitted operation was abandoned before reporting a result")]
    Abandoned,

    /// A user-supplied callback failed
    #[error("callback failed: {0}")]
    Hook(#[source] BoxError),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a configuration error
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Whether this error came from admission control rather than the operation itself
    pub fn is_admission(&self) -> bool {
        matches!(self, Error::LimiterDenied(_))
    }
}
