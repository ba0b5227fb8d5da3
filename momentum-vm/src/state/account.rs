//! Per-account state: balances, chain frontier, chain plasma, receive
//! sequencer and contract storage.

use momentum_primitives::{Address, Amount, Hash, HashHeight, TokenStandard};
use momentum_storage::{ReadStore, ReadStoreExt, WriteStore, WriteStoreExt};
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::keys;
use crate::error::{VmError, VmResult};

/// Block hash at a height plus the account's chain plasma after that block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightRecord {
    pub hash: Hash,
    pub chain_plasma: u64,
}

/// Bounds of a receive sequencer: entries live at `head..tail`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct SequencerCursor {
    head: u64,
    tail: u64,
}

pub fn balance<S: ReadStore + ?Sized>(
    store: &S,
    address: &Address,
    token: &TokenStandard,
) -> VmResult<Amount> {
    Ok(store
        .get(&keys::balance(address, token))?
        .map(|bytes| Amount::from_bytes_be(&bytes))
        .unwrap_or_default())
}

/// Every non-zero balance of `address`.
pub fn balances<S: ReadStore + ?Sized>(
    store: &S,
    address: &Address,
) -> VmResult<Vec<(TokenStandard, Amount)>> {
    let prefix = keys::balance_prefix(address);
    store
        .scan_prefix(&prefix)?
        .into_iter()
        .map(|(key, value)| -> VmResult<(TokenStandard, Amount)> {
            let token = TokenStandard::from_bytes(&key[prefix.len()..])?;
            Ok((token, Amount::from_bytes_be(&value)))
        })
        .collect()
}

pub fn set_balance<W: WriteStore + ?Sized>(
    store: &mut W,
    address: &Address,
    token: &TokenStandard,
    amount: &Amount,
) -> VmResult<()> {
    let key = keys::balance(address, token);
    if amount.is_zero() {
        store.delete(&key)?;
    } else {
        store.put(key, amount.to_bytes_be())?;
    }
    Ok(())
}

pub fn add_balance<W: WriteStore + ?Sized>(
    store: &mut W,
    address: &Address,
    token: &TokenStandard,
    amount: &Amount,
) -> VmResult<()> {
    if amount.is_zero() {
        return Ok(());
    }
    let current = balance(&*store, address, token)?;
    set_balance(store, address, token, &(current + amount))
}

/// Debits `amount`, failing `InsufficientBalance` without touching state.
pub fn sub_balance<W: WriteStore + ?Sized>(
    store: &mut W,
    address: &Address,
    token: &TokenStandard,
    amount: &Amount,
) -> VmResult<()> {
    if amount.is_zero() {
        return Ok(());
    }
    let current = balance(&*store, address, token)?;
    if current < *amount {
        trace!(target: "momentum", %address, %token, "insufficient balance");
        return Err(VmError::InsufficientBalance);
    }
    set_balance(store, address, token, &(current - amount))
}

/// Latest block of the account chain, if any.
pub fn frontier<S: ReadStore + ?Sized>(store: &S, address: &Address) -> VmResult<Option<HashHeight>> {
    Ok(store.get_record(&keys::frontier(address))?)
}

pub fn set_frontier<W: WriteStore + ?Sized>(
    store: &mut W,
    address: &Address,
    frontier: &HashHeight,
) -> VmResult<()> {
    Ok(store.put_record(keys::frontier(address), frontier)?)
}

/// Plasma used by every block of the chain so far, confirmed or not.
pub fn chain_plasma<S: ReadStore + ?Sized>(store: &S, address: &Address) -> VmResult<u64> {
    Ok(store
        .get_record(&keys::chain_plasma(address))?
        .unwrap_or(0))
}

pub fn set_chain_plasma<W: WriteStore + ?Sized>(
    store: &mut W,
    address: &Address,
    plasma: u64,
) -> VmResult<()> {
    Ok(store.put_record(keys::chain_plasma(address), &plasma)?)
}

pub fn height_record<S: ReadStore + ?Sized>(
    store: &S,
    address: &Address,
    height: u64,
) -> VmResult<Option<HeightRecord>> {
    Ok(store.get_record(&keys::height(address, height))?)
}

pub fn put_height_record<W: WriteStore + ?Sized>(
    store: &mut W,
    address: &Address,
    height: u64,
    record: &HeightRecord,
) -> VmResult<()> {
    Ok(store.put_record(keys::height(address, height), record)?)
}

fn sequencer_cursor<S: ReadStore + ?Sized>(store: &S, address: &Address) -> VmResult<SequencerCursor> {
    Ok(store
        .get_record(&keys::sequencer_cursor(address))?
        .unwrap_or_default())
}

/// Enqueues a send awaiting receipt by the embedded contract at `address`.
pub fn sequencer_push<W: WriteStore + ?Sized>(
    store: &mut W,
    address: &Address,
    send_hash: &Hash,
) -> VmResult<()> {
    let mut cursor = sequencer_cursor(&*store, address)?;
    store.put_record(keys::sequencer_entry(address, cursor.tail), send_hash)?;
    cursor.tail += 1;
    store.put_record(keys::sequencer_cursor(address), &cursor)?;
    Ok(())
}

/// Oldest pending send of the contract at `address`.
pub fn sequencer_peek<S: ReadStore + ?Sized>(store: &S, address: &Address) -> VmResult<Option<Hash>> {
    let cursor = sequencer_cursor(store, address)?;
    if cursor.head == cursor.tail {
        return Ok(None);
    }
    let hash = store
        .get_record(&keys::sequencer_entry(address, cursor.head))?
        .ok_or_else(|| VmError::internal(format!("sequencer entry {} missing", cursor.head)))?;
    Ok(Some(hash))
}

/// Removes and returns the oldest pending send.
pub fn sequencer_pop<W: WriteStore + ?Sized>(store: &mut W, address: &Address) -> VmResult<Option<Hash>> {
    let Some(hash) = sequencer_peek(&*store, address)? else {
        return Ok(None);
    };
    let mut cursor = sequencer_cursor(&*store, address)?;
    store.delete(&keys::sequencer_entry(address, cursor.head))?;
    cursor.head += 1;
    store.put_record(keys::sequencer_cursor(address), &cursor)?;
    Ok(Some(hash))
}

/// Every pending send of the contract at `address`, oldest first.
pub fn sequencer_pending<S: ReadStore + ?Sized>(store: &S, address: &Address) -> VmResult<Vec<Hash>> {
    let cursor = sequencer_cursor(store, address)?;
    (cursor.head..cursor.tail)
        .map(|seq| {
            store
                .get_record::<Hash>(&keys::sequencer_entry(address, seq))?
                .ok_or_else(|| VmError::internal(format!("sequencer entry {seq} missing")))
        })
        .collect()
}
