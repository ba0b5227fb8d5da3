//! Global ledger tables: block records, receive markers, confirmations,
//! momentums, committed plasma and the unconfirmed-block queue.

use momentum_primitives::{AccountBlock, Address, Hash, Momentum};
use momentum_storage::{ReadStore, ReadStoreExt, WriteStore, WriteStoreExt};

use super::keys;
use crate::error::{VmError, VmResult};

pub fn block<S: ReadStore + ?Sized>(store: &S, hash: &Hash) -> VmResult<Option<AccountBlock>> {
    Ok(store.get_record(&keys::block(hash))?)
}

pub fn put_block<W: WriteStore + ?Sized>(store: &mut W, block: &AccountBlock) -> VmResult<()> {
    Ok(store.put_record(keys::block(&block.hash), block)?)
}

/// Hash of the block that received `send_hash`, if any.
pub fn received_by<S: ReadStore + ?Sized>(store: &S, send_hash: &Hash) -> VmResult<Option<Hash>> {
    Ok(store.get_record(&keys::received(send_hash))?)
}

pub fn mark_received<W: WriteStore + ?Sized>(
    store: &mut W,
    send_hash: &Hash,
    receive_hash: &Hash,
) -> VmResult<()> {
    Ok(store.put_record(keys::received(send_hash), receive_hash)?)
}

/// Momentum height that confirmed `hash`, if confirmed.
pub fn confirmation<S: ReadStore + ?Sized>(store: &S, hash: &Hash) -> VmResult<Option<u64>> {
    Ok(store.get_record(&keys::confirmation(hash))?)
}

pub fn set_confirmation<W: WriteStore + ?Sized>(store: &mut W, hash: &Hash, height: u64) -> VmResult<()> {
    Ok(store.put_record(keys::confirmation(hash), &height)?)
}

pub fn momentum_by_height<S: ReadStore + ?Sized>(store: &S, height: u64) -> VmResult<Option<Momentum>> {
    Ok(store.get_record(&keys::momentum_by_height(height))?)
}

pub fn momentum_height<S: ReadStore + ?Sized>(store: &S, hash: &Hash) -> VmResult<Option<u64>> {
    Ok(store.get_record(&keys::momentum_height_by_hash(hash))?)
}

pub fn momentum_by_hash<S: ReadStore + ?Sized>(store: &S, hash: &Hash) -> VmResult<Option<Momentum>> {
    match momentum_height(store, hash)? {
        Some(height) => momentum_by_height(store, height),
        None => Ok(None),
    }
}

pub fn frontier_momentum<S: ReadStore + ?Sized>(store: &S) -> VmResult<Option<Momentum>> {
    let height: Option<u64> = store.get_record(&keys::frontier_momentum())?;
    match height {
        Some(height) => momentum_by_height(store, height)?
            .map(Some)
            .ok_or_else(|| VmError::internal(format!("frontier momentum {height} missing"))),
        None => Ok(None),
    }
}

/// Stores `momentum` and makes it the frontier.
pub fn put_momentum<W: WriteStore + ?Sized>(store: &mut W, momentum: &Momentum) -> VmResult<()> {
    store.put_record(keys::momentum_by_height(momentum.height), momentum)?;
    store.put_record(keys::momentum_height_by_hash(&momentum.hash), &momentum.height)?;
    store.put_record(keys::frontier_momentum(), &momentum.height)?;
    Ok(())
}

/// Chain plasma of `address` as of its latest confirmed block.
pub fn committed_plasma<S: ReadStore + ?Sized>(store: &S, address: &Address) -> VmResult<u64> {
    Ok(store
        .get_record(&keys::committed_plasma(address))?
        .unwrap_or(0))
}

pub fn set_committed_plasma<W: WriteStore + ?Sized>(
    store: &mut W,
    address: &Address,
    plasma: u64,
) -> VmResult<()> {
    Ok(store.put_record(keys::committed_plasma(address), &plasma)?)
}

/// Appends `hash` to the queue of blocks awaiting a momentum.
pub fn push_unconfirmed<W: WriteStore + ?Sized>(store: &mut W, hash: &Hash) -> VmResult<()> {
    let seq: u64 = store
        .get_record(&keys::unconfirmed_cursor())?
        .unwrap_or(0);
    store.put_record(keys::unconfirmed(seq), hash)?;
    store.put_record(keys::unconfirmed_index(hash), &seq)?;
    store.put_record(keys::unconfirmed_cursor(), &(seq + 1))?;
    Ok(())
}

pub fn remove_unconfirmed<W: WriteStore + ?Sized>(store: &mut W, hash: &Hash) -> VmResult<()> {
    let index = keys::unconfirmed_index(hash);
    let seq: Option<u64> = store.get_record(&index)?;
    if let Some(seq) = seq {
        store.delete(&keys::unconfirmed(seq))?;
        store.delete(&index)?;
    }
    Ok(())
}

/// Unconfirmed block hashes in the order they were applied.
pub fn unconfirmed<S: ReadStore + ?Sized>(store: &S) -> VmResult<Vec<Hash>> {
    store
        .scan_prefix(&keys::unconfirmed_prefix())?
        .into_iter()
        .map(|(_, value)| {
            bincode::deserialize(&value)
                .map_err(|err| VmError::internal(format!("unconfirmed entry: {err}")))
        })
        .collect()
}
