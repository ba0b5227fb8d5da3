//! Error types for storage operations.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by storage backends and record codecs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Backend failure.
    #[error("storage: backend failure: {0}")]
    Backend(String),

    /// Stored bytes could not be encoded or decoded.
    #[error("storage: codec error for {context}: {message}")]
    Codec { context: String, message: String },

    /// A record that must exist was absent.
    #[error("storage: missing record: {0}")]
    Missing(String),
}

impl StorageError {
    /// Creates a backend error.
    #[inline]
    pub fn backend(message: impl Into<String>) -> Self {
        StorageError::Backend(message.into())
    }

    /// Creates a codec error.
    pub fn codec(context: impl Into<String>, message: impl std::fmt::Display) -> Self {
        StorageError::Codec {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Creates a missing-record error.
    pub fn missing(what: impl Into<String>) -> Self {
        StorageError::Missing(what.into())
    }
}
