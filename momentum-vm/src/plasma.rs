//! Plasma meter: what a block costs and what an account may spend.
//!
//! Plasma comes from two sources: proof-of-work attached to the block
//! (`difficulty`) and QSR fused for the account (`fused_plasma`, drawn from
//! the account's available plasma). Fused plasma used by a block is returned
//! once a momentum confirms it.

use momentum_primitives::{AccountBlock, Address, Amount};
use momentum_storage::ReadStore;
use num_traits::ToPrimitive;
use tracing::{debug, trace};

use crate::constants::*;
use crate::embedded::{plasma as plasma_contract, EmbeddedRegistry};
use crate::error::{VmError, VmResult};
use crate::pow;
use crate::state::{account, ledger};

/// Per-call costs of embedded methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlasmaTable {
    pub embedded_simple: u64,
    pub embedded_withdraw: u64,
    pub embedded_double_withdraw: u64,
}

impl Default for PlasmaTable {
    fn default() -> Self {
        Self {
            embedded_simple: EMBEDDED_SIMPLE_PLASMA,
            embedded_withdraw: EMBEDDED_WITHDRAW_PLASMA,
            embedded_double_withdraw: EMBEDDED_DOUBLE_WITHDRAW_PLASMA,
        }
    }
}

/// Plasma bought by fusing `amount` QSR base units.
pub fn fused_amount_to_plasma(amount: &Amount) -> u64 {
    let units = (amount / COST_PER_FUSION_UNIT)
        .to_u64()
        .unwrap_or(u64::MAX)
        .min(MAX_FUSION_UNITS_PER_ACCOUNT);
    units * PLASMA_PER_FUSION_UNIT
}

/// Plasma provided by proof-of-work of `difficulty`.
pub fn difficulty_to_plasma(difficulty: u64) -> u64 {
    (difficulty / POW_DIFFICULTY_PER_PLASMA).min(MAX_PLASMA_FOR_ACCOUNT_BLOCK)
}

/// Difficulty needed to produce `plasma`.
///
/// # Errors
///
/// `ForbiddenParam` above [`MAX_PLASMA_FOR_ACCOUNT_BLOCK`].
pub fn get_difficulty_for_plasma(plasma: u64) -> VmResult<u64> {
    if plasma > MAX_PLASMA_FOR_ACCOUNT_BLOCK {
        return Err(VmError::ForbiddenParam);
    }
    Ok(plasma * POW_DIFFICULTY_PER_PLASMA)
}

/// Minimum plasma `block` must carry.
pub fn get_base_plasma_for_account_block(
    registry: &EmbeddedRegistry,
    table: &PlasmaTable,
    block: &AccountBlock,
) -> VmResult<u64> {
    if block.address.is_embedded() {
        return Ok(0);
    }
    if block.data.len() > MAX_DATA_LENGTH {
        return Err(VmError::PayloadTooBig);
    }
    if block.is_receive() {
        return Ok(ACCOUNT_BLOCK_BASE_PLASMA);
    }
    if block.to_address.is_embedded() {
        let method = registry.get_embedded_method(
            block.momentum_acknowledged.height,
            &block.to_address,
            &block.data,
        )?;
        return method.plasma(table);
    }
    Ok(ACCOUNT_BLOCK_BASE_PLASMA + AB_BYTE_DATA_PLASMA * block.data.len() as u64)
}

/// Fused plasma `address` may still spend.
///
/// `committed + fused − live`, where `live` counts unconfirmed blocks too.
/// A chain can never have confirmed more plasma than it used, so
/// `committed > live` is an internal fault. Cancelling a fusion can leave
/// unconfirmed spend larger than the remaining stake; that account has no
/// plasma left rather than a debt.
pub fn available_plasma<S: ReadStore + ?Sized>(store: &S, address: &Address) -> VmResult<u64> {
    let committed = ledger::committed_plasma(store, address)?;
    let live = account::chain_plasma(store, address)?;
    let unconfirmed = live.checked_sub(committed).ok_or_else(|| {
        VmError::internal(format!(
            "committed plasma {committed} exceeds chain plasma {live} for {address}"
        ))
    })?;
    let fused = fused_amount_to_plasma(&plasma_contract::fused_amount(store, address)?);
    if unconfirmed > fused {
        debug!(target: "momentum", %address, fused, unconfirmed, "fused plasma overdrawn");
    }
    Ok(fused.saturating_sub(unconfirmed))
}

/// Admission checks run before any balance or contract logic.
///
/// Returns the base plasma of the block.
pub fn check_admission<S: ReadStore + ?Sized>(
    store: &S,
    registry: &EmbeddedRegistry,
    table: &PlasmaTable,
    block: &AccountBlock,
) -> VmResult<u64> {
    let base = get_base_plasma_for_account_block(registry, table, block)?;
    let pow_plasma = difficulty_to_plasma(block.difficulty);
    let total = pow_plasma
        .checked_add(block.fused_plasma)
        .ok_or(VmError::BlockPlasmaLimitReached { total: u64::MAX })?;

    if block.base_plasma != base || block.total_plasma != total {
        return Err(VmError::PlasmaMismatch {
            declared_base: block.base_plasma,
            base,
            declared_total: block.total_plasma,
            total,
        });
    }
    if total < base {
        return Err(VmError::NotEnoughTotalPlasma { total, base });
    }
    if total > MAX_PLASMA_FOR_ACCOUNT_BLOCK {
        return Err(VmError::BlockPlasmaLimitReached { total });
    }
    if block.difficulty > 0
        && !pow::check_nonce(&block.pow_data_hash(), &block.nonce, block.difficulty)
    {
        return Err(VmError::InvalidNonce);
    }
    if block.fused_plasma > 0 {
        let available = available_plasma(store, &block.address)?;
        if block.fused_plasma > available {
            return Err(VmError::NotEnoughPlasma {
                fused: block.fused_plasma,
                available,
            });
        }
    }
    trace!(target: "momentum", hash = %block.hash, base, total, "plasma admitted");
    Ok(base)
}
