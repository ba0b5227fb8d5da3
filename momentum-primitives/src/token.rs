//! Implementation of `TokenStandard`, the 10-byte token identifier.

use crate::constants::TOKEN_STANDARD_SIZE;
use crate::crypto::Crypto;
use crate::error::{PrimitiveError, PrimitiveResult};
use crate::hash::Hash;
use crate::serde_helpers::impl_fixed_bytes_serde;
use std::fmt;
use std::str::FromStr;

const DISPLAY_PREFIX: &str = "zts";

/// Identifies a token; new standards are derived from the issuing block hash.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenStandard([u8; TOKEN_STANDARD_SIZE]);

/// Placeholder standard carried by blocks that move no tokens.
pub const ZERO_TOKEN_STANDARD: TokenStandard = TokenStandard([0u8; TOKEN_STANDARD_SIZE]);
/// The ZNN protocol token.
pub const ZNN_TOKEN_STANDARD: TokenStandard =
    TokenStandard([0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
/// The QSR protocol token, fused for plasma.
pub const QSR_TOKEN_STANDARD: TokenStandard =
    TokenStandard([0, 0, 0, 0, 0, 0, 0, 0, 0, 2]);

impl TokenStandard {
    /// Alias for the byte length.
    pub const LENGTH: usize = TOKEN_STANDARD_SIZE;

    /// Wraps raw bytes.
    pub const fn from_array(bytes: [u8; TOKEN_STANDARD_SIZE]) -> Self {
        Self(bytes)
    }

    /// Creates a token standard from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns `PrimitiveError::InvalidLength` unless the input is exactly 10 bytes.
    pub fn from_bytes(bytes: &[u8]) -> PrimitiveResult<Self> {
        let array: [u8; TOKEN_STANDARD_SIZE] = bytes.try_into().map_err(|_| {
            PrimitiveError::invalid_length("TokenStandard", TOKEN_STANDARD_SIZE, bytes.len())
        })?;
        Ok(Self(array))
    }

    /// Derives the standard of a token issued by the send block `issuing_hash`.
    pub fn derive(issuing_hash: &Hash) -> Self {
        let digest = Crypto::sha3_256_parts(&[b"token-standard", issuing_hash.as_slice()]);
        let mut bytes = [0u8; TOKEN_STANDARD_SIZE];
        bytes.copy_from_slice(&digest[..TOKEN_STANDARD_SIZE]);
        Self(bytes)
    }

    /// Checks for the zero placeholder.
    pub fn is_zero(&self) -> bool {
        *self == ZERO_TOKEN_STANDARD
    }

    /// Returns the raw bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for TokenStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", DISPLAY_PREFIX, hex::encode(self.0))
    }
}

impl fmt::Debug for TokenStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenStandard({self})")
    }
}

impl FromStr for TokenStandard {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.strip_prefix(DISPLAY_PREFIX).unwrap_or(s);
        let bytes = hex::decode(body)
            .map_err(|e| PrimitiveError::invalid_format(format!("token standard: {e}")))?;
        Self::from_bytes(&bytes)
    }
}

impl_fixed_bytes_serde!(TokenStandard);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_tokens_distinct() {
        assert_ne!(ZNN_TOKEN_STANDARD, QSR_TOKEN_STANDARD);
        assert!(ZERO_TOKEN_STANDARD.is_zero());
        assert!(!ZNN_TOKEN_STANDARD.is_zero());
    }

    #[test]
    fn test_display_parse() {
        assert_eq!(ZNN_TOKEN_STANDARD.to_string(), "zts00000000000000000001");
        let parsed: TokenStandard = "zts00000000000000000002".parse().unwrap();
        assert_eq!(parsed, QSR_TOKEN_STANDARD);
    }

    #[test]
    fn test_derive_is_deterministic() {
        let hash = Hash::digest(b"issue");
        assert_eq!(TokenStandard::derive(&hash), TokenStandard::derive(&hash));
        assert_ne!(
            TokenStandard::derive(&hash),
            TokenStandard::derive(&Hash::digest(b"other"))
        );
    }
}
