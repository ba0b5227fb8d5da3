//! Implementation of `Hash`, a 32-byte SHA3-256 digest, and `HashHeight`.

use crate::constants::HASH_SIZE;
use crate::crypto::Crypto;
use crate::error::{PrimitiveError, PrimitiveResult};
use crate::serde_helpers::impl_fixed_bytes_serde;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 32-byte digest identifying blocks, momentums and fusion entries.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    /// Alias for the byte length.
    pub const LENGTH: usize = HASH_SIZE;

    /// Returns the all-zero hash.
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self([0u8; HASH_SIZE])
    }

    /// Wraps an existing digest.
    #[inline]
    #[must_use]
    pub const fn from_array(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    /// Creates a hash from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns `PrimitiveError::InvalidLength` unless the input is exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> PrimitiveResult<Self> {
        let array: [u8; HASH_SIZE] = bytes
            .try_into()
            .map_err(|_| PrimitiveError::invalid_length("Hash", HASH_SIZE, bytes.len()))?;
        Ok(Self(array))
    }

    /// SHA3-256 of `data`.
    #[must_use]
    pub fn digest(data: &[u8]) -> Self {
        Self(Crypto::sha3_256(data))
    }

    /// SHA3-256 over the concatenation of `parts`.
    #[must_use]
    pub fn digest_parts(parts: &[&[u8]]) -> Self {
        Self(Crypto::sha3_256_parts(parts))
    }

    /// Checks whether every byte is zero.
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Returns the digest bytes.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Returns the digest as an owned array.
    #[inline]
    #[must_use]
    pub fn to_array(&self) -> [u8; HASH_SIZE] {
        self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", hex::encode(self.0))
    }
}

impl FromStr for Hash {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| PrimitiveError::invalid_format(format!("hash: {e}")))?;
        Self::from_bytes(&bytes)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl_fixed_bytes_serde!(Hash);

/// A hash paired with the height it was produced at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashHeight {
    /// Block or momentum hash.
    pub hash: Hash,
    /// Height of that block or momentum.
    pub height: u64,
}

impl HashHeight {
    /// Creates a new pair.
    pub const fn new(hash: Hash, height: u64) -> Self {
        Self { hash, height }
    }

    /// Canonical bytes: hash followed by the big-endian height.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HASH_SIZE + 8);
        out.extend_from_slice(self.hash.as_slice());
        out.extend_from_slice(&self.height.to_be_bytes());
        out
    }
}

impl fmt::Display for HashHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.hash, self.height)
    }
}
