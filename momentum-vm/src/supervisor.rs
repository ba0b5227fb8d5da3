//! Fault boundary around the state machine.
//!
//! Every entry point runs under `catch_unwind`; panics and internal faults
//! surface as a single [`VmError::EngineFault`]. Successful runs are packaged
//! into transaction records and their structure is re-checked before they
//! are returned.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use momentum_primitives::{AccountBlock, BlockType, Hash, KeyPair, Momentum};
use momentum_storage::ReadStore;
use tracing::{debug, error};

use crate::constants::MAX_DATA_LENGTH;
use crate::embedded::EmbeddedRegistry;
use crate::error::{VmError, VmResult};
use crate::genesis::Genesis;
use crate::machine::{next_position, Machine};
use crate::plasma;
use crate::pow;
use crate::state::ledger;
use crate::transaction::{AccountBlockTransaction, MomentumTransaction};

/// Entry point for applying and generating blocks and momentums.
#[derive(Debug, Clone)]
pub struct Supervisor {
    machine: Machine,
}

impl Supervisor {
    pub fn new(registry: Arc<EmbeddedRegistry>, chain_identifier: u64) -> Self {
        Self::from_machine(Machine::new(registry, chain_identifier))
    }

    pub fn from_machine(machine: Machine) -> Self {
        Self { machine }
    }

    /// Supervisor over the process-wide standard registry.
    pub fn with_global_registry(chain_identifier: u64) -> VmResult<Self> {
        Ok(Self::new(EmbeddedRegistry::global()?, chain_identifier))
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn apply_block(&self, store: &dyn ReadStore, block: &AccountBlock) -> VmResult<AccountBlockTransaction> {
        self.guard("apply_block", || {
            validate_block_structure(block)?;
            let changes = self.machine.apply_block(store, block)?;
            Ok(AccountBlockTransaction {
                block: block.clone(),
                changes,
            })
        })
    }

    pub fn apply_momentum(&self, store: &dyn ReadStore, momentum: &Momentum) -> VmResult<MomentumTransaction> {
        self.guard("apply_momentum", || {
            validate_momentum_structure(momentum)?;
            let changes = self.machine.apply_momentum(store, momentum)?;
            Ok(MomentumTransaction {
                momentum: momentum.clone(),
                changes,
            })
        })
    }

    /// Completes a user block template, signs it with `key` and applies it.
    ///
    /// The template supplies the type, destination, token, amount, payload
    /// and optional PoW difficulty (plus `from_block_hash` for receives).
    /// Linkage, the acknowledged momentum and plasma fields are filled in;
    /// fused plasma covers whatever the PoW does not.
    pub fn generate_from_template(
        &self,
        store: &dyn ReadStore,
        template: &AccountBlock,
        key: &KeyPair,
    ) -> VmResult<AccountBlockTransaction> {
        self.guard("generate_from_template", || {
            let block = self.fill_template(store, template, key)?;
            let changes = self.machine.apply_block(store, &block)?;
            validate_block_structure(&block)?;
            Ok(AccountBlockTransaction { block, changes })
        })
    }

    fn fill_template(
        &self,
        store: &dyn ReadStore,
        template: &AccountBlock,
        key: &KeyPair,
    ) -> VmResult<AccountBlock> {
        if !matches!(template.block_type, BlockType::UserSend | BlockType::UserReceive) {
            return Err(VmError::ContractBlockNotAllowed);
        }
        let mut block = template.clone();
        block.chain_identifier = self.machine.chain_identifier();
        block.address = key.address();
        let (height, previous) = next_position(store, &block.address)?;
        block.height = height;
        block.previous_hash = previous;
        block.momentum_acknowledged = ledger::frontier_momentum(store)?
            .ok_or(VmError::MomentumNotFound)?
            .hash_height();

        if block.block_type == BlockType::UserReceive {
            if let Some(send) = ledger::block(store, &block.from_block_hash)? {
                block.amount = send.amount;
                block.token_standard = send.token_standard;
            }
        } else if block.to_address.is_embedded() {
            let method = self.machine.registry().get_embedded_method(
                block.momentum_acknowledged.height,
                &block.to_address,
                &block.data,
            )?;
            method.validate_send_block(&mut block)?;
        }

        let base = plasma::get_base_plasma_for_account_block(
            self.machine.registry(),
            self.machine.plasma_table(),
            &block,
        )?;
        let pow_plasma = plasma::difficulty_to_plasma(block.difficulty);
        block.fused_plasma = base.saturating_sub(pow_plasma);
        block.base_plasma = base;
        block.total_plasma = pow_plasma + block.fused_plasma;
        if block.difficulty > 0 {
            block.nonce = pow::generate_nonce(&block.pow_data_hash(), block.difficulty);
        }
        block.hash = block.compute_hash();
        block.sign(key);
        Ok(block)
    }

    /// Generates the contract receive of `send_hash` against the frontier momentum.
    pub fn generate_auto_receive(
        &self,
        store: &dyn ReadStore,
        send_hash: &Hash,
    ) -> VmResult<AccountBlockTransaction> {
        self.guard("generate_auto_receive", || {
            let acknowledged = ledger::frontier_momentum(store)?
                .ok_or(VmError::MomentumNotFound)?
                .hash_height();
            let (block, changes) = self
                .machine
                .generate_embedded_receive(store, send_hash, acknowledged)?;
            validate_block_structure(&block)?;
            Ok(AccountBlockTransaction { block, changes })
        })
    }

    /// Builds, signs and applies a momentum confirming every unconfirmed block.
    pub fn generate_momentum(
        &self,
        store: &dyn ReadStore,
        timestamp: u64,
        key: &KeyPair,
    ) -> VmResult<MomentumTransaction> {
        self.guard("generate_momentum", || {
            let frontier = ledger::frontier_momentum(store)?
                .ok_or_else(|| VmError::invalid_momentum("genesis momentum missing"))?;
            let content = ledger::unconfirmed(store)?
                .iter()
                .map(|hash| {
                    ledger::block(store, hash)?
                        .map(|block| block.header())
                        .ok_or_else(|| VmError::internal(format!("unconfirmed block {hash} missing")))
                })
                .collect::<VmResult<Vec<_>>>()?;

            let mut momentum = Momentum::next(
                self.machine.chain_identifier(),
                frontier.hash_height(),
                timestamp,
                content,
            );
            momentum.sign(key);
            let changes = self.machine.apply_momentum(store, &momentum)?;
            validate_momentum_structure(&momentum)?;
            Ok(MomentumTransaction { momentum, changes })
        })
    }

    /// Applies `genesis` to an empty ledger.
    pub fn bootstrap(&self, store: &dyn ReadStore, genesis: &Genesis) -> VmResult<MomentumTransaction> {
        self.guard("bootstrap", || {
            let (momentum, changes) = self.machine.apply_genesis(store, genesis)?;
            validate_momentum_structure(&momentum)?;
            Ok(MomentumTransaction { momentum, changes })
        })
    }

    fn guard<T>(&self, operation: &'static str, run: impl FnOnce() -> VmResult<T>) -> VmResult<T> {
        match panic::catch_unwind(AssertUnwindSafe(run)) {
            Ok(Err(err)) if err.is_internal() => {
                error!(target: "momentum", operation, error = %err, "engine fault");
                Err(match err {
                    VmError::EngineFault(_) => err,
                    other => VmError::EngineFault(other.to_string()),
                })
            }
            Ok(Err(err)) => {
                debug!(target: "momentum", operation, error = %err, "rejected");
                Err(err)
            }
            Ok(ok) => ok,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(target: "momentum", operation, panic = %message, "engine panicked");
                Err(VmError::EngineFault(message))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Structural checks that need no ledger state.
pub fn validate_block_structure(block: &AccountBlock) -> VmResult<()> {
    if !block.hash_matches() {
        return Err(VmError::InvalidBlockHash);
    }
    if block.data.len() > MAX_DATA_LENGTH {
        return Err(VmError::PayloadTooBig);
    }
    if block.block_type.is_contract() {
        if !block.public_key.is_empty() || !block.signature.is_empty() {
            return Err(VmError::InvalidSignature("contract blocks are unsigned".to_string()));
        }
    } else {
        block
            .verify_signature()
            .map_err(|err| VmError::InvalidSignature(err.to_string()))?;
    }
    block
        .descendant_blocks
        .iter()
        .try_for_each(validate_block_structure)
}

/// Hash check plus the producer signature on every momentum after genesis.
pub fn validate_momentum_structure(momentum: &Momentum) -> VmResult<()> {
    if !momentum.hash_matches() {
        return Err(VmError::invalid_momentum("hash does not match content"));
    }
    if momentum.height > 1 {
        momentum
            .verify_signature()
            .map_err(|err| VmError::InvalidSignature(err.to_string()))?;
    }
    Ok(())
}
