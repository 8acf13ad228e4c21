//! Error types for the notes service.

use thiserror::Error;

/// Result type alias using the notes service's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for note operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or empty required field (client-caused)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A note with the same id is already stored
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error originates in the persistence layer.
    ///
    /// Store errors are reported to clients generically; validation and
    /// not-found errors carry their message through.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            Error::Database(_) | Error::Io(_) | Error::Serialization(_) | Error::Internal(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
