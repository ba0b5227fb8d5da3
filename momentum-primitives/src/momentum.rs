//! Momentums: batches confirming account blocks at a given height.

use crate::constants::MOMENTUM_VERSION;
use crate::crypto::{verify_signature, KeyPair};
use crate::error::PrimitiveResult;
use crate::hash::{Hash, HashHeight};
use crate::serde_helpers;
use crate::Address;
use serde::{Deserialize, Serialize};

/// Reference to one account block inside momentum content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountHeader {
    pub address: Address,
    pub hash_height: HashHeight,
}

/// A confirmed batch of account-block references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Momentum {
    pub version: u64,
    pub chain_identifier: u64,
    pub hash: Hash,
    pub previous_hash: Hash,
    pub height: u64,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub content: Vec<AccountHeader>,
    #[serde(with = "serde_helpers::bytes")]
    pub public_key: Vec<u8>,
    #[serde(with = "serde_helpers::bytes")]
    pub signature: Vec<u8>,
}

impl Momentum {
    /// Creates an unhashed momentum following `previous`.
    pub fn next(
        chain_identifier: u64,
        previous: HashHeight,
        timestamp: u64,
        content: Vec<AccountHeader>,
    ) -> Self {
        let mut momentum = Self {
            version: MOMENTUM_VERSION,
            chain_identifier,
            hash: Hash::zero(),
            previous_hash: previous.hash,
            height: previous.height + 1,
            timestamp,
            content,
            public_key: Vec::new(),
            signature: Vec::new(),
        };
        momentum.hash = momentum.compute_hash();
        momentum
    }

    /// Hash over the ordered content references.
    pub fn content_hash(&self) -> Hash {
        let mut buf = Vec::with_capacity(self.content.len() * 60);
        for header in &self.content {
            buf.extend_from_slice(header.address.as_slice());
            buf.extend_from_slice(&header.hash_height.to_bytes());
        }
        Hash::digest(&buf)
    }

    /// Computes the momentum hash from the current field values.
    pub fn compute_hash(&self) -> Hash {
        Hash::digest_parts(&[
            &self.version.to_be_bytes(),
            &self.chain_identifier.to_be_bytes(),
            self.previous_hash.as_slice(),
            &self.height.to_be_bytes(),
            &self.timestamp.to_be_bytes(),
            self.content_hash().as_slice(),
        ])
    }

    pub fn hash_matches(&self) -> bool {
        self.hash == self.compute_hash()
    }

    pub fn hash_height(&self) -> HashHeight {
        HashHeight::new(self.hash, self.height)
    }

    /// Signs the stored hash with `key`.
    pub fn sign(&mut self, key: &KeyPair) {
        self.public_key = key.public_key();
        self.signature = key.sign(self.hash.as_slice());
    }

    pub fn verify_signature(&self) -> PrimitiveResult<()> {
        verify_signature(&self.public_key, self.hash.as_slice(), &self.signature)
    }
}
