//! Error types for primitive parsing and verification.

use thiserror::Error;

/// Errors raised while constructing or verifying primitive values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// Input has the wrong number of bytes.
    #[error("Invalid length for {kind}: expected {expected}, got {actual}")]
    InvalidLength {
        /// Name of the type being decoded.
        kind: &'static str,
        /// Required length in bytes.
        expected: usize,
        /// Supplied length in bytes.
        actual: usize,
    },

    /// Textual input could not be parsed.
    #[error("Invalid format: {message}")]
    InvalidFormat {
        /// Error message.
        message: String,
    },

    /// Signature or public key rejected.
    #[error("Invalid signature: {message}")]
    InvalidSignature {
        /// Error message.
        message: String,
    },
}

impl PrimitiveError {
    /// Create an invalid length error.
    pub fn invalid_length(kind: &'static str, expected: usize, actual: usize) -> Self {
        Self::InvalidLength {
            kind,
            expected,
            actual,
        }
    }

    /// Create an invalid format error.
    pub fn invalid_format<S: Into<String>>(message: S) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create an invalid signature error.
    pub fn invalid_signature<S: Into<String>>(message: S) -> Self {
        Self::InvalidSignature {
            message: message.into(),
        }
    }
}

/// Result type for primitive operations.
pub type PrimitiveResult<T> = std::result::Result<T, PrimitiveError>;
