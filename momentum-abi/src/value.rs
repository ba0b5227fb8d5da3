//! Tagged ABI values.

use momentum_primitives::{Address, Hash, TokenStandard};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::ToPrimitive;

use crate::error::{AbiError, AbiResult};

/// A decoded or to-be-encoded ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// `uintN` and `intN`.
    Int(BigInt),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    /// `bytesN`; length must equal `N`.
    FixedBytes(Vec<u8>),
    Address(Address),
    Hash(Hash),
    TokenStandard(TokenStandard),
    /// `T[k]`
    Array(Vec<Value>),
    /// `T[]`
    Slice(Vec<Value>),
}

impl Value {
    /// Variant name used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::FixedBytes(_) => "fixed bytes",
            Value::Address(_) => "address",
            Value::Hash(_) => "hash",
            Value::TokenStandard(_) => "token standard",
            Value::Array(_) => "array",
            Value::Slice(_) => "slice",
        }
    }

    fn mismatch(&self, expected: &'static str) -> AbiError {
        AbiError::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }

    pub fn as_int(&self) -> AbiResult<&BigInt> {
        match self {
            Value::Int(value) => Ok(value),
            other => Err(other.mismatch("int")),
        }
    }

    /// Non-negative integer as `BigUint`.
    pub fn to_biguint(&self) -> AbiResult<BigUint> {
        self.as_int()?
            .to_biguint()
            .ok_or_else(|| self.mismatch("unsigned int"))
    }

    pub fn to_u64(&self) -> AbiResult<u64> {
        self.as_int()?.to_u64().ok_or_else(|| self.mismatch("u64"))
    }

    pub fn as_bool(&self) -> AbiResult<bool> {
        match self {
            Value::Bool(value) => Ok(*value),
            other => Err(other.mismatch("bool")),
        }
    }

    pub fn as_str(&self) -> AbiResult<&str> {
        match self {
            Value::String(value) => Ok(value),
            other => Err(other.mismatch("string")),
        }
    }

    /// Contents of `bytes` or `bytesN`.
    pub fn as_bytes(&self) -> AbiResult<&[u8]> {
        match self {
            Value::Bytes(value) | Value::FixedBytes(value) => Ok(value),
            other => Err(other.mismatch("bytes")),
        }
    }

    pub fn as_address(&self) -> AbiResult<Address> {
        match self {
            Value::Address(value) => Ok(*value),
            other => Err(other.mismatch("address")),
        }
    }

    pub fn as_hash(&self) -> AbiResult<Hash> {
        match self {
            Value::Hash(value) => Ok(*value),
            other => Err(other.mismatch("hash")),
        }
    }

    pub fn as_token_standard(&self) -> AbiResult<TokenStandard> {
        match self {
            Value::TokenStandard(value) => Ok(*value),
            other => Err(other.mismatch("token standard")),
        }
    }

    /// Elements of a fixed or dynamic array.
    pub fn as_array(&self) -> AbiResult<&[Value]> {
        match self {
            Value::Array(values) | Value::Slice(values) => Ok(values),
            other => Err(other.mismatch("array")),
        }
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Int(BigInt::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(BigInt::from(value))
    }
}

impl From<BigUint> for Value {
    fn from(value: BigUint) -> Self {
        Value::Int(BigInt::from_biguint(Sign::Plus, value))
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Address> for Value {
    fn from(value: Address) -> Self {
        Value::Address(value)
    }
}

impl From<Hash> for Value {
    fn from(value: Hash) -> Self {
        Value::Hash(value)
    }
}

impl From<TokenStandard> for Value {
    fn from(value: TokenStandard) -> Self {
        Value::TokenStandard(value)
    }
}
