//! # Momentum Primitives
//!
//! Fundamental types shared by every layer of the momentum ledger.
//!
//! - [`Hash`] / [`HashHeight`]: SHA3-256 digests and height-tagged references
//! - [`Address`]: 20-byte accounts; kind byte `1` marks the embedded contract range
//! - [`TokenStandard`]: 10-byte token identifiers (`ZNN`, `QSR`, issued tokens)
//! - [`AccountBlock`] / [`Momentum`]: ledger records and their canonical hashes
//! - [`KeyPair`] / [`Crypto`]: opaque signing and hashing utilities
//!
//! ## Example
//!
//! ```rust
//! use momentum_primitives::{Address, Hash};
//!
//! let contract = Address::embedded(b"plasma");
//! assert!(contract.is_embedded());
//! assert!(Hash::zero().is_zero());
//! ```

pub mod account_block;
pub mod address;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod hash;
pub mod momentum;
pub mod serde_helpers;
pub mod token;

/// Token amounts in base units.
pub type Amount = num_bigint::BigUint;

// Re-exports
pub use account_block::{AccountBlock, BlockType};
pub use address::Address;
pub use constants::*;
pub use crypto::{verify_signature, Crypto, KeyPair};
pub use error::{PrimitiveError, PrimitiveResult};
pub use hash::{Hash, HashHeight};
pub use momentum::{AccountHeader, Momentum};
pub use token::{TokenStandard, QSR_TOKEN_STANDARD, ZERO_TOKEN_STANDARD, ZNN_TOKEN_STANDARD};
