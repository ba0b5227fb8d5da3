//! Key layout of the engine's state.
//!
//! Every key starts with a one-byte table prefix. Per-account tables are
//! nested under `ACCOUNT` followed by the 20-byte address and a sub-prefix.

use momentum_primitives::{Address, Hash, TokenStandard};

pub const ACCOUNT: u8 = 0x01;
pub const BLOCK: u8 = 0x02;
pub const RECEIVED: u8 = 0x03;
pub const CONFIRMATION: u8 = 0x04;
pub const MOMENTUM_BY_HEIGHT: u8 = 0x05;
pub const MOMENTUM_HEIGHT_BY_HASH: u8 = 0x06;
pub const FRONTIER_MOMENTUM: u8 = 0x07;
pub const COMMITTED_PLASMA: u8 = 0x08;
pub const UNCONFIRMED: u8 = 0x09;
pub const UNCONFIRMED_INDEX: u8 = 0x0a;
pub const UNCONFIRMED_CURSOR: u8 = 0x0b;

const BALANCE: u8 = 0x01;
const FRONTIER: u8 = 0x02;
const CHAIN_PLASMA: u8 = 0x03;
const HEIGHT: u8 = 0x04;
const SEQUENCER: u8 = 0x05;
const SEQUENCER_CURSOR: u8 = 0x06;
const CONTRACT_STORAGE: u8 = 0x10;

fn account(address: &Address, sub: u8) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + Address::LENGTH + 1 + 32);
    key.push(ACCOUNT);
    key.extend_from_slice(address.as_slice());
    key.push(sub);
    key
}

fn with_suffix(mut key: Vec<u8>, suffix: &[u8]) -> Vec<u8> {
    key.extend_from_slice(suffix);
    key
}

pub fn balance_prefix(address: &Address) -> Vec<u8> {
    account(address, BALANCE)
}

pub fn balance(address: &Address, token: &TokenStandard) -> Vec<u8> {
    with_suffix(account(address, BALANCE), token.as_slice())
}

pub fn frontier(address: &Address) -> Vec<u8> {
    account(address, FRONTIER)
}

pub fn chain_plasma(address: &Address) -> Vec<u8> {
    account(address, CHAIN_PLASMA)
}

pub fn height(address: &Address, height: u64) -> Vec<u8> {
    with_suffix(account(address, HEIGHT), &height.to_be_bytes())
}

pub fn sequencer_entry(address: &Address, seq: u64) -> Vec<u8> {
    with_suffix(account(address, SEQUENCER), &seq.to_be_bytes())
}

pub fn sequencer_cursor(address: &Address) -> Vec<u8> {
    account(address, SEQUENCER_CURSOR)
}

/// Prefix of every storage key of the contract at `address`.
pub fn contract_storage_prefix(address: &Address) -> Vec<u8> {
    account(address, CONTRACT_STORAGE)
}

pub fn contract_storage(address: &Address, key: &[u8]) -> Vec<u8> {
    with_suffix(contract_storage_prefix(address), key)
}

pub fn block(hash: &Hash) -> Vec<u8> {
    with_suffix(vec![BLOCK], hash.as_slice())
}

pub fn received(send_hash: &Hash) -> Vec<u8> {
    with_suffix(vec![RECEIVED], send_hash.as_slice())
}

pub fn confirmation(hash: &Hash) -> Vec<u8> {
    with_suffix(vec![CONFIRMATION], hash.as_slice())
}

pub fn momentum_by_height(height: u64) -> Vec<u8> {
    with_suffix(vec![MOMENTUM_BY_HEIGHT], &height.to_be_bytes())
}

pub fn momentum_height_by_hash(hash: &Hash) -> Vec<u8> {
    with_suffix(vec![MOMENTUM_HEIGHT_BY_HASH], hash.as_slice())
}

pub fn frontier_momentum() -> Vec<u8> {
    vec![FRONTIER_MOMENTUM]
}

pub fn committed_plasma(address: &Address) -> Vec<u8> {
    with_suffix(vec![COMMITTED_PLASMA], address.as_slice())
}

pub fn unconfirmed_prefix() -> Vec<u8> {
    vec![UNCONFIRMED]
}

pub fn unconfirmed(seq: u64) -> Vec<u8> {
    with_suffix(vec![UNCONFIRMED], &seq.to_be_bytes())
}

pub fn unconfirmed_index(hash: &Hash) -> Vec<u8> {
    with_suffix(vec![UNCONFIRMED_INDEX], hash.as_slice())
}

pub fn unconfirmed_cursor() -> Vec<u8> {
    vec![UNCONFIRMED_CURSOR]
}
