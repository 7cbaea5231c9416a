//! Error types for the profile service
//!
//! Business outcomes (not found, conflict) are never errors; they are
//! reported through [`crate::ProfileOutcome`]. This type covers genuine
//! faults only.

use thiserror::Error;

/// Result type alias for profile operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the profile service
#[derive(Error, Debug)]
pub enum Error {
    /// Storage backend faults
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input (e.g. an empty username)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors from file-backed storage
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
