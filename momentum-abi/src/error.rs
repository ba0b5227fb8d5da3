//! Error types for the ABI codec.

use thiserror::Error;

/// Result type for ABI operations.
pub type AbiResult<T> = Result<T, AbiError>;

/// Errors raised while parsing schemas or packing and unpacking payloads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// Payload too short to carry a selector and arguments.
    #[error("abi: empty input")]
    EmptyInput,

    /// Payload of an argument-less method carries trailing bytes.
    #[error("abi: input too long")]
    InputTooLong,

    /// Selector does not resolve to the expected method.
    #[error("abi: could not locate method {0}")]
    CouldNotLocateMethod(String),

    /// No method with that name in the schema.
    #[error("abi: method {0} not found")]
    MethodNotFound(String),

    /// No variable with that name in the schema.
    #[error("abi: variable {0} not found")]
    VariableNotFound(String),

    /// Unknown or malformed type string.
    #[error("abi: invalid type {0}")]
    InvalidType(String),

    /// Schema JSON could not be parsed or is inconsistent.
    #[error("abi: invalid schema: {0}")]
    InvalidSchema(String),

    /// Values do not match the argument types.
    #[error("abi: pack failed: {0}")]
    PackFailed(String),

    /// Payload is not a canonical encoding of the argument types.
    #[error("abi: unpack failed: {0}")]
    UnpackFailed(String),

    /// A decoded value was read as the wrong variant.
    #[error("abi: type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl AbiError {
    pub fn pack_failed(message: impl Into<String>) -> Self {
        AbiError::PackFailed(message.into())
    }

    pub fn unpack_failed(message: impl Into<String>) -> Self {
        AbiError::UnpackFailed(message.into())
    }

    pub fn invalid_type(ty: impl Into<String>) -> Self {
        AbiError::InvalidType(ty.into())
    }

    pub fn invalid_schema(message: impl Into<String>) -> Self {
        AbiError::InvalidSchema(message.into())
    }
}
