//! Implementation of `Address`, a 20-byte account identifier.
//!
//! The first byte is the address kind; user addresses are derived from a
//! public key, embedded contract addresses are fixed names in the reserved
//! contract range.

use crate::constants::{ADDRESS_CORE_SIZE, ADDRESS_SIZE, CONTRACT_ADDRESS_KIND, USER_ADDRESS_KIND};
use crate::crypto::Crypto;
use crate::error::{PrimitiveError, PrimitiveResult};
use crate::serde_helpers::impl_fixed_bytes_serde;
use std::fmt;
use std::str::FromStr;

/// A 20-byte account address.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    /// Alias for the byte length.
    pub const LENGTH: usize = ADDRESS_SIZE;

    /// Returns the all-zero address.
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self([0u8; ADDRESS_SIZE])
    }

    /// Builds an embedded contract address from an ASCII name (truncated to 19 bytes).
    #[must_use]
    pub const fn embedded(name: &[u8]) -> Self {
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes[0] = CONTRACT_ADDRESS_KIND;
        let mut i = 0;
        while i < name.len() && i < ADDRESS_CORE_SIZE {
            bytes[i + 1] = name[i];
            i += 1;
        }
        Self(bytes)
    }

    /// Derives the user address owning `public_key`.
    #[must_use]
    pub fn from_public_key(public_key: &[u8]) -> Self {
        let digest = Crypto::sha3_256(public_key);
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes[0] = USER_ADDRESS_KIND;
        bytes[1..].copy_from_slice(&digest[..ADDRESS_CORE_SIZE]);
        Self(bytes)
    }

    /// Creates an address from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns `PrimitiveError::InvalidLength` unless the input is exactly 20 bytes.
    pub fn from_bytes(bytes: &[u8]) -> PrimitiveResult<Self> {
        let array: [u8; ADDRESS_SIZE] = bytes
            .try_into()
            .map_err(|_| PrimitiveError::invalid_length("Address", ADDRESS_SIZE, bytes.len()))?;
        Ok(Self(array))
    }

    /// Returns the kind byte.
    #[inline]
    pub const fn kind(&self) -> u8 {
        self.0[0]
    }

    /// Checks whether this address lies in the reserved embedded contract range.
    #[inline]
    pub const fn is_embedded(&self) -> bool {
        self.0[0] == CONTRACT_ADDRESS_KIND
    }

    /// Checks whether this is a key-derived user address.
    #[inline]
    pub const fn is_user(&self) -> bool {
        self.0[0] == USER_ADDRESS_KIND
    }

    /// Returns the raw bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Returns the raw bytes as an owned array.
    #[inline]
    pub const fn to_array(&self) -> [u8; ADDRESS_SIZE] {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| PrimitiveError::invalid_format(format!("address: {e}")))?;
        Self::from_bytes(&bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl_fixed_bytes_serde!(Address);
