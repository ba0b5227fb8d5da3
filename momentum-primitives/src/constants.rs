//! Protocol-wide constants shared by every layer.

/// Size of a hash in bytes.
pub const HASH_SIZE: usize = 32;
/// Size of an address in bytes.
pub const ADDRESS_SIZE: usize = 20;
/// Size of the address core (everything after the kind byte).
pub const ADDRESS_CORE_SIZE: usize = ADDRESS_SIZE - 1;
/// Size of a token standard in bytes.
pub const TOKEN_STANDARD_SIZE: usize = 10;
/// Size of a proof-of-work nonce in bytes.
pub const NONCE_SIZE: usize = 8;

/// Address kind byte of user (key-derived) addresses.
pub const USER_ADDRESS_KIND: u8 = 0;
/// Address kind byte of embedded contract addresses.
pub const CONTRACT_ADDRESS_KIND: u8 = 1;

/// Current account block version.
pub const ACCOUNT_BLOCK_VERSION: u64 = 1;
/// Current momentum version.
pub const MOMENTUM_VERSION: u64 = 1;
/// Chain identifier used when none is configured.
pub const DEFAULT_CHAIN_IDENTIFIER: u64 = 1;

/// Decimals of both protocol tokens.
pub const COIN_DECIMALS: u8 = 8;
/// One whole ZNN or QSR in base units.
pub const ONE_COIN: u64 = 100_000_000;
