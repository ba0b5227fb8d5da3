//! Hashing and signing utilities.
//!
//! The engine treats these as opaque: SHA3-256 for every digest and ed25519
//! for block and momentum signatures.

use crate::address::Address;
use crate::error::{PrimitiveError, PrimitiveResult};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use sha3::{Digest, Sha3_256};

/// Static hash helpers.
pub struct Crypto;

impl Crypto {
    /// Computes SHA3-256 of the input data.
    ///
    /// # Example
    /// ```
    /// use momentum_primitives::Crypto;
    /// let hash = Crypto::sha3_256(b"momentum");
    /// assert_eq!(hash.len(), 32);
    /// ```
    pub fn sha3_256(data: &[u8]) -> [u8; 32] {
        let mut hasher = Sha3_256::new();
        hasher.update(data);
        hasher.finalize().into()
    }

    /// Computes SHA3-256 over several slices without concatenating them first.
    pub fn sha3_256_parts(parts: &[&[u8]]) -> [u8; 32] {
        let mut hasher = Sha3_256::new();
        for part in parts {
            hasher.update(part);
        }
        hasher.finalize().into()
    }
}

/// An ed25519 key pair used to author user blocks and momentums.
#[derive(Clone)]
pub struct KeyPair {
    signing: SigningKey,
}

impl KeyPair {
    /// Builds a key pair from a 32-byte secret seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing: SigningKey::from_bytes(&seed),
        }
    }

    /// Returns the 32-byte public key.
    pub fn public_key(&self) -> Vec<u8> {
        self.signing.verifying_key().to_bytes().to_vec()
    }

    /// Returns the user address derived from the public key.
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key())
    }

    /// Signs `message` and returns the 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing.sign(message).to_bytes().to_vec()
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Verifies an ed25519 signature.
///
/// # Errors
///
/// Returns `PrimitiveError::InvalidSignature` if the key or signature is
/// malformed or the signature does not match.
pub fn verify_signature(public_key: &[u8], message: &[u8], signature: &[u8]) -> PrimitiveResult<()> {
    let key_bytes: [u8; 32] = public_key
        .try_into()
        .map_err(|_| PrimitiveError::invalid_length("PublicKey", 32, public_key.len()))?;
    let key = VerifyingKey::from_bytes(&key_bytes)
        .map_err(|e| PrimitiveError::invalid_signature(e.to_string()))?;
    let signature = Signature::from_slice(signature)
        .map_err(|e| PrimitiveError::invalid_signature(e.to_string()))?;
    key.verify(message, &signature)
        .map_err(|e| PrimitiveError::invalid_signature(e.to_string()))
}
