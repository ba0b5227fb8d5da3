//! Account blocks: one state transition of one account.

use crate::constants::{ACCOUNT_BLOCK_VERSION, NONCE_SIZE};
use crate::crypto::{verify_signature, KeyPair};
use crate::error::PrimitiveResult;
use crate::hash::{Hash, HashHeight};
use crate::momentum::AccountHeader;
use crate::serde_helpers;
use crate::token::TokenStandard;
use crate::{Address, Amount};
use serde::{Deserialize, Serialize};

/// Kind of an account block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlockType {
    /// Send authored by a user.
    #[default]
    UserSend = 2,
    /// Receive authored by a user.
    UserReceive = 3,
    /// Send emitted by an embedded contract while receiving.
    ContractSend = 4,
    /// Receive regenerated for an embedded contract.
    ContractReceive = 5,
}

impl BlockType {
    /// Wire value of the block type.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn is_send(self) -> bool {
        matches!(self, BlockType::UserSend | BlockType::ContractSend)
    }

    pub const fn is_receive(self) -> bool {
        matches!(self, BlockType::UserReceive | BlockType::ContractReceive)
    }

    /// Blocks produced by the engine on behalf of an embedded contract.
    pub const fn is_contract(self) -> bool {
        matches!(self, BlockType::ContractSend | BlockType::ContractReceive)
    }
}

/// One ledger entry for one account.
///
/// The hash covers every field except `descendant_blocks`, `public_key` and
/// `signature`. Descendants continue the contract chain after the receive
/// block, so they link to its hash instead of being covered by it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBlock {
    pub version: u64,
    pub chain_identifier: u64,
    pub block_type: BlockType,
    pub hash: Hash,
    pub previous_hash: Hash,
    pub height: u64,
    pub momentum_acknowledged: HashHeight,

    pub address: Address,
    pub to_address: Address,
    #[serde(with = "serde_helpers::amount")]
    pub amount: Amount,
    pub token_standard: TokenStandard,

    /// Send block being received; zero for sends.
    pub from_block_hash: Hash,
    /// Sends emitted by a contract receive, in chain order.
    pub descendant_blocks: Vec<AccountBlock>,
    /// ABI-encoded call for sends; failure text for failed contract receives.
    #[serde(with = "serde_helpers::bytes")]
    pub data: Vec<u8>,

    pub fused_plasma: u64,
    pub difficulty: u64,
    pub nonce: [u8; NONCE_SIZE],
    pub base_plasma: u64,
    pub total_plasma: u64,

    /// State-diff hash of a contract receive.
    pub changes_hash: Hash,

    #[serde(with = "serde_helpers::bytes")]
    pub public_key: Vec<u8>,
    #[serde(with = "serde_helpers::bytes")]
    pub signature: Vec<u8>,
}

impl AccountBlock {
    /// Creates an unhashed template of the given type.
    pub fn template(block_type: BlockType, chain_identifier: u64) -> Self {
        Self {
            version: ACCOUNT_BLOCK_VERSION,
            chain_identifier,
            block_type,
            ..Self::default()
        }
    }

    pub fn is_send(&self) -> bool {
        self.block_type.is_send()
    }

    pub fn is_receive(&self) -> bool {
        self.block_type.is_receive()
    }

    /// Canonical byte encoding covered by the block hash.
    pub fn hash_preimage(&self) -> Vec<u8> {
        let amount = self.amount.to_bytes_be();
        let mut out = Vec::with_capacity(320 + amount.len());
        out.extend_from_slice(&self.version.to_be_bytes());
        out.extend_from_slice(&self.chain_identifier.to_be_bytes());
        out.push(self.block_type.as_u8());
        out.extend_from_slice(self.previous_hash.as_slice());
        out.extend_from_slice(&self.height.to_be_bytes());
        out.extend_from_slice(&self.momentum_acknowledged.to_bytes());
        out.extend_from_slice(self.address.as_slice());
        out.extend_from_slice(self.to_address.as_slice());
        out.extend_from_slice(&(amount.len() as u32).to_be_bytes());
        out.extend_from_slice(&amount);
        out.extend_from_slice(self.token_standard.as_slice());
        out.extend_from_slice(self.from_block_hash.as_slice());
        out.extend_from_slice(Hash::digest(&self.data).as_slice());
        out.extend_from_slice(&self.fused_plasma.to_be_bytes());
        out.extend_from_slice(&self.difficulty.to_be_bytes());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.base_plasma.to_be_bytes());
        out.extend_from_slice(&self.total_plasma.to_be_bytes());
        out.extend_from_slice(self.changes_hash.as_slice());
        out
    }

    /// Computes the block hash from the current field values.
    pub fn compute_hash(&self) -> Hash {
        Hash::digest(&self.hash_preimage())
    }

    /// Checks that the stored hash matches the fields.
    pub fn hash_matches(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Data hashed by proof-of-work for this block.
    pub fn pow_data_hash(&self) -> Hash {
        Hash::digest_parts(&[self.address.as_slice(), self.previous_hash.as_slice()])
    }

    /// Signs the stored hash with `key` and records the public key.
    pub fn sign(&mut self, key: &KeyPair) {
        self.public_key = key.public_key();
        self.signature = key.sign(self.hash.as_slice());
    }

    /// Verifies the signature over the stored hash and that the key owns `address`.
    pub fn verify_signature(&self) -> PrimitiveResult<()> {
        if Address::from_public_key(&self.public_key) != self.address {
            return Err(crate::PrimitiveError::invalid_signature(
                "public key does not match block address",
            ));
        }
        verify_signature(&self.public_key, self.hash.as_slice(), &self.signature)
    }

    /// Header referenced from momentum content.
    pub fn header(&self) -> AccountHeader {
        AccountHeader {
            address: self.address,
            hash_height: HashHeight::new(self.hash, self.height),
        }
    }

    /// Hash and height of this block.
    pub fn hash_height(&self) -> HashHeight {
        HashHeight::new(self.hash, self.height)
    }
}
