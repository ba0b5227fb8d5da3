//! ABI type descriptors and their canonical names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AbiError, AbiResult};

/// Bytes per encoded word.
pub const WORD_SIZE: usize = 32;

/// Type of one ABI argument or array element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    /// Unsigned integer of the given bit width.
    Uint(usize),
    /// Signed integer of the given bit width.
    Int(usize),
    Bool,
    String,
    Bytes,
    /// `bytesN` with `1 <= N <= 32`.
    FixedBytes(usize),
    Address,
    Hash,
    TokenStandard,
    /// `T[k]`
    Array(Box<AbiType>, usize),
    /// `T[]`
    Slice(Box<AbiType>),
}

impl AbiType {
    /// Parses a type string such as `uint256`, `bytes32[2][]` or `tokenStandard`.
    pub fn parse(text: &str) -> AbiResult<Self> {
        let text = text.trim();
        if let Some(body) = text.strip_suffix(']') {
            let open = body
                .rfind('[')
                .ok_or_else(|| AbiError::invalid_type(text))?;
            let inner = Self::parse(&body[..open])?;
            let size = &body[open + 1..];
            if size.is_empty() {
                return Ok(AbiType::Slice(Box::new(inner)));
            }
            let len: usize = size.parse().map_err(|_| AbiError::invalid_type(text))?;
            if len == 0 {
                return Err(AbiError::invalid_type(text));
            }
            return Ok(AbiType::Array(Box::new(inner), len));
        }

        match text {
            "bool" => return Ok(AbiType::Bool),
            "string" => return Ok(AbiType::String),
            "bytes" => return Ok(AbiType::Bytes),
            "address" => return Ok(AbiType::Address),
            "hash" => return Ok(AbiType::Hash),
            "tokenStandard" => return Ok(AbiType::TokenStandard),
            "uint" => return Ok(AbiType::Uint(256)),
            "int" => return Ok(AbiType::Int(256)),
            _ => {}
        }

        if let Some(bits) = text.strip_prefix("uint") {
            return parse_bits(bits, text).map(AbiType::Uint);
        }
        if let Some(bits) = text.strip_prefix("int") {
            return parse_bits(bits, text).map(AbiType::Int);
        }
        if let Some(len) = text.strip_prefix("bytes") {
            let len: usize = len.parse().map_err(|_| AbiError::invalid_type(text))?;
            if (1..=WORD_SIZE).contains(&len) {
                return Ok(AbiType::FixedBytes(len));
            }
        }
        Err(AbiError::invalid_type(text))
    }

    /// Whether the encoding lives in the tail of the enclosing tuple.
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::String | AbiType::Bytes | AbiType::Slice(_) => true,
            AbiType::Array(inner, _) => inner.is_dynamic(),
            _ => false,
        }
    }

    /// Bytes occupied in the head of a tuple.
    pub fn head_size(&self) -> usize {
        match self {
            AbiType::Array(inner, len) if !inner.is_dynamic() => inner.head_size() * len,
            _ => WORD_SIZE,
        }
    }
}

fn parse_bits(bits: &str, text: &str) -> AbiResult<usize> {
    let bits: usize = bits.parse().map_err(|_| AbiError::invalid_type(text))?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(AbiError::invalid_type(text));
    }
    Ok(bits)
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Uint(bits) => write!(f, "uint{bits}"),
            AbiType::Int(bits) => write!(f, "int{bits}"),
            AbiType::Bool => f.write_str("bool"),
            AbiType::String => f.write_str("string"),
            AbiType::Bytes => f.write_str("bytes"),
            AbiType::FixedBytes(len) => write!(f, "bytes{len}"),
            AbiType::Address => f.write_str("address"),
            AbiType::Hash => f.write_str("hash"),
            AbiType::TokenStandard => f.write_str("tokenStandard"),
            AbiType::Array(inner, len) => write!(f, "{inner}[{len}]"),
            AbiType::Slice(inner) => write!(f, "{inner}[]"),
        }
    }
}

impl FromStr for AbiType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for AbiType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AbiType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalars() {
        assert_eq!(AbiType::parse("uint256").unwrap(), AbiType::Uint(256));
        assert_eq!(AbiType::parse("uint8").unwrap(), AbiType::Uint(8));
        assert_eq!(AbiType::parse("int64").unwrap(), AbiType::Int(64));
        assert_eq!(AbiType::parse("bytes32").unwrap(), AbiType::FixedBytes(32));
        assert_eq!(AbiType::parse("tokenStandard").unwrap(), AbiType::TokenStandard);
    }

    #[test]
    fn test_parse_nested_arrays() {
        let ty = AbiType::parse("bytes32[2][]").unwrap();
        assert_eq!(
            ty,
            AbiType::Slice(Box::new(AbiType::Array(Box::new(AbiType::FixedBytes(32)), 2)))
        );
        assert_eq!(ty.to_string(), "bytes32[2][]");
        assert!(ty.is_dynamic());
    }

    #[test]
    fn test_invalid_types() {
        for text in ["uint7", "uint264", "bytes0", "bytes33", "float", "address[0]", "hash[x]", "[]"] {
            assert!(
                matches!(AbiType::parse(text), Err(AbiError::InvalidType(_))),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn test_head_sizes() {
        assert_eq!(AbiType::Uint(8).head_size(), 32);
        assert_eq!(AbiType::parse("uint256[3]").unwrap().head_size(), 96);
        assert_eq!(AbiType::parse("string[3]").unwrap().head_size(), 32);
        assert_eq!(AbiType::parse("uint256[2][2]").unwrap().head_size(), 128);
    }

    #[test]
    fn test_canonical_aliases() {
        assert_eq!(AbiType::parse("uint").unwrap().to_string(), "uint256");
        assert_eq!(AbiType::parse("int").unwrap().to_string(), "int256");
    }
}
