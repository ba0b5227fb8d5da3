//! Block and momentum state machine.
//!
//! Every operation reads from a borrowed store and stages its writes in an
//! [`Overlay`]; the resulting [`Changes`] are returned and never applied
//! here. A contract receive runs the embedded method inside a nested overlay
//! so that a failed call can be discarded without touching the outer diff.

use std::sync::Arc;

use momentum_primitives::{AccountBlock, AccountHeader, Address, BlockType, Hash, HashHeight, Momentum};
use momentum_storage::{Changes, Overlay, ReadStore, WriteStore};
use num_traits::Zero;
use tracing::{debug, instrument, warn};

use crate::constants::{FUSE_EXPIRATION_HEIGHT, MAX_DATA_LENGTH};
use crate::embedded::plasma::{self as plasma_contract, FusionEntry};
use crate::embedded::{AcknowledgedMomentum, EmbeddedRegistry, MethodContext};
use crate::error::{VmError, VmResult};
use crate::genesis::Genesis;
use crate::plasma::{self, PlasmaTable};
use crate::state::{account, ledger, HeightRecord};

/// Applies and generates account blocks and momentums.
#[derive(Debug, Clone)]
pub struct Machine {
    registry: Arc<EmbeddedRegistry>,
    chain_identifier: u64,
    plasma_table: PlasmaTable,
}

impl Machine {
    pub fn new(registry: Arc<EmbeddedRegistry>, chain_identifier: u64) -> Self {
        Self {
            registry,
            chain_identifier,
            plasma_table: PlasmaTable::default(),
        }
    }

    pub fn with_plasma_table(mut self, plasma_table: PlasmaTable) -> Self {
        self.plasma_table = plasma_table;
        self
    }

    pub fn registry(&self) -> &EmbeddedRegistry {
        &self.registry
    }

    pub fn chain_identifier(&self) -> u64 {
        self.chain_identifier
    }

    pub fn plasma_table(&self) -> &PlasmaTable {
        &self.plasma_table
    }

    /// Validates `block` against `store` and returns the state diff it causes.
    ///
    /// Contract receives are regenerated from their send and must match
    /// bit for bit; contract sends only enter the ledger as descendants.
    #[instrument(target = "momentum", skip_all, fields(hash = %block.hash, height = block.height, kind = ?block.block_type))]
    pub fn apply_block(&self, store: &dyn ReadStore, block: &AccountBlock) -> VmResult<Changes> {
        let mut work = Overlay::new(store);
        self.check_linkage(&work, block)?;

        match block.block_type {
            BlockType::ContractSend => return Err(VmError::ContractBlockNotAllowed),
            BlockType::ContractReceive => return self.replay_contract_receive(store, block),
            BlockType::UserSend | BlockType::UserReceive => {}
        }
        if block.address.is_embedded() {
            return Err(VmError::ContractBlockNotAllowed);
        }

        let base = plasma::check_admission(&work, &self.registry, &self.plasma_table, block)?;
        let used = account::chain_plasma(&work, &block.address)?
            .checked_add(block.fused_plasma)
            .ok_or_else(|| VmError::internal("chain plasma overflow"))?;
        account::set_chain_plasma(&mut work, &block.address, used)?;

        if block.block_type == BlockType::UserSend {
            self.apply_send(&mut work, block)?;
        } else {
            apply_user_receive(&mut work, block)?;
        }
        record_block(&mut work, block)?;

        debug!(target: "momentum", base, fused = block.fused_plasma, "block applied");
        Ok(work.into_changes())
    }

    fn check_linkage<S: ReadStore + ?Sized>(&self, store: &S, block: &AccountBlock) -> VmResult<()> {
        if !block.hash_matches() {
            return Err(VmError::InvalidBlockHash);
        }
        if block.chain_identifier != self.chain_identifier {
            return Err(VmError::ChainIdentifierMismatch {
                expected: self.chain_identifier,
                actual: block.chain_identifier,
            });
        }
        let (height, previous) = next_position(store, &block.address)?;
        if block.height != height {
            return Err(VmError::InvalidHeight {
                expected: height,
                actual: block.height,
            });
        }
        if block.previous_hash != previous {
            return Err(VmError::InvalidPreviousHash);
        }
        acknowledged_momentum(store, &block.momentum_acknowledged)?;
        Ok(())
    }

    fn apply_send<W: WriteStore + ?Sized>(&self, work: &mut W, block: &AccountBlock) -> VmResult<()> {
        if block.to_address.is_embedded() {
            let method = self.registry.get_embedded_method(
                block.momentum_acknowledged.height,
                &block.to_address,
                &block.data,
            )?;
            let mut canonical = block.clone();
            method.validate_send_block(&mut canonical)?;
            if canonical.data != block.data {
                return Err(VmError::NonCanonicalPayload);
            }
        }
        account::sub_balance(work, &block.address, &block.token_standard, &block.amount)?;
        if block.to_address.is_embedded() {
            account::sequencer_push(work, &block.to_address, &block.hash)?;
        }
        Ok(())
    }

    fn replay_contract_receive(&self, store: &dyn ReadStore, block: &AccountBlock) -> VmResult<Changes> {
        let (expected, changes) =
            self.generate_embedded_receive(store, &block.from_block_hash, block.momentum_acknowledged)?;
        if expected.changes_hash != block.changes_hash {
            return Err(VmError::ReceiveMismatch(format!(
                "changes hash {} differs from {}",
                block.changes_hash, expected.changes_hash
            )));
        }
        if expected.hash != block.hash {
            return Err(VmError::ReceiveMismatch(format!(
                "hash {} differs from {}",
                block.hash, expected.hash
            )));
        }
        let descendants_match = expected.descendant_blocks.len() == block.descendant_blocks.len()
            && expected
                .descendant_blocks
                .iter()
                .zip(&block.descendant_blocks)
                .all(|(ours, theirs)| ours.hash == theirs.hash);
        if !descendants_match {
            return Err(VmError::ReceiveMismatch("descendant blocks differ".to_string()));
        }
        Ok(changes)
    }

    /// Builds the contract receive for `send_hash` and the diff it causes.
    ///
    /// A recoverable failure of the embedded call does not fail generation:
    /// the call's writes are dropped, the amount is refunded through a single
    /// descendant and the receive's `data` carries the error text.
    #[instrument(target = "momentum", skip_all, fields(send = %send_hash, momentum = acknowledged.height))]
    pub fn generate_embedded_receive(
        &self,
        store: &dyn ReadStore,
        send_hash: &Hash,
        acknowledged: HashHeight,
    ) -> VmResult<(AccountBlock, Changes)> {
        let mut work = Overlay::new(store);
        let momentum = acknowledged_momentum(&work, &acknowledged)?;
        let send = ledger::block(&work, send_hash)?
            .filter(AccountBlock::is_send)
            .ok_or(VmError::SendBlockNotFound)?;
        let contract = send.to_address;
        if !contract.is_embedded() {
            return Err(VmError::NotContractAddress);
        }
        if ledger::received_by(&work, send_hash)?.is_some() {
            return Err(VmError::AlreadyReceived);
        }
        match account::sequencer_pop(&mut work, &contract)? {
            None => return Err(VmError::NothingToReceive),
            Some(next) if next != *send_hash => {
                return Err(VmError::OutOfOrderReceive {
                    expected: next.to_string(),
                })
            }
            Some(_) => {}
        }

        let mut receive = AccountBlock::template(BlockType::ContractReceive, self.chain_identifier);
        receive.address = contract;
        receive.from_block_hash = send.hash;
        receive.amount = send.amount.clone();
        receive.token_standard = send.token_standard;
        receive.momentum_acknowledged = acknowledged;

        let attempt = {
            let mut snapshot = Overlay::new(&work);
            self.try_receive(&mut snapshot, &send, momentum)
                .map(|descendants| (snapshot.into_changes(), descendants))
        };
        let (descendants, succeeded) = match attempt {
            Ok((changes, descendants)) => {
                work.apply(&changes)?;
                (descendants, true)
            }
            Err(err) if err.is_internal() => return Err(err),
            Err(err) => {
                warn!(
                    target: "momentum",
                    contract = %contract,
                    error = %err,
                    "embedded call rolled back"
                );
                receive.data = err.to_string().into_bytes();
                (refund(&mut work, &send, self.chain_identifier)?, false)
            }
        };

        receive.changes_hash = work.changes().hash();
        let (height, previous) = next_position(&work, &contract)?;
        receive.height = height;
        receive.previous_hash = previous;
        receive.hash = receive.compute_hash();

        let mut tip = receive.hash_height();
        let mut finalized = Vec::with_capacity(descendants.len());
        for mut descendant in descendants {
            descendant.chain_identifier = self.chain_identifier;
            descendant.momentum_acknowledged = acknowledged;
            descendant.height = tip.height + 1;
            descendant.previous_hash = tip.hash;
            descendant.hash = descendant.compute_hash();
            tip = descendant.hash_height();
            finalized.push(descendant);
        }
        receive.descendant_blocks = finalized;

        ledger::mark_received(&mut work, &send.hash, &receive.hash)?;
        record_block(&mut work, &receive)?;
        for descendant in &receive.descendant_blocks {
            record_block(&mut work, descendant)?;
            if descendant.to_address.is_embedded() {
                account::sequencer_push(&mut work, &descendant.to_address, &descendant.hash)?;
            }
        }

        debug!(
            target: "momentum",
            hash = %receive.hash,
            height = receive.height,
            descendants = receive.descendant_blocks.len(),
            failed = !succeeded,
            "contract receive generated"
        );
        Ok((receive, work.into_changes()))
    }

    fn try_receive(
        &self,
        snapshot: &mut Overlay<'_>,
        send: &AccountBlock,
        momentum: AcknowledgedMomentum,
    ) -> VmResult<Vec<AccountBlock>> {
        let contract = send.to_address;
        account::add_balance(snapshot, &contract, &send.token_standard, &send.amount)?;
        // a payload-less contract send is a refund between contracts: credit only
        if send.block_type == BlockType::ContractSend && send.data.is_empty() {
            return Ok(Vec::new());
        }
        let method = self
            .registry
            .get_embedded_method(momentum.height, &contract, &send.data)?;
        let descendants = {
            let mut context = MethodContext::new(snapshot, contract, momentum, self.chain_identifier);
            method.receive_block(&mut context, send)?
        };
        for descendant in &descendants {
            self.apply_descendant(snapshot, &contract, descendant, momentum.height)?;
        }
        Ok(descendants)
    }

    /// Send path for blocks emitted by a contract.
    fn apply_descendant<W: WriteStore + ?Sized>(
        &self,
        work: &mut W,
        contract: &Address,
        descendant: &AccountBlock,
        momentum_height: u64,
    ) -> VmResult<()> {
        if descendant.block_type != BlockType::ContractSend || descendant.address != *contract {
            return Err(VmError::InvalidDescendant(format!(
                "{:?} from {} emitted by {contract}",
                descendant.block_type, descendant.address
            )));
        }
        if descendant.data.len() > MAX_DATA_LENGTH {
            return Err(VmError::PayloadTooBig);
        }
        if descendant.to_address.is_embedded() {
            let method = self.registry.get_embedded_method(
                momentum_height,
                &descendant.to_address,
                &descendant.data,
            )?;
            let mut canonical = descendant.clone();
            method.validate_send_block(&mut canonical)?;
            if canonical.data != descendant.data {
                return Err(VmError::NonCanonicalPayload);
            }
        }
        account::sub_balance(work, contract, &descendant.token_standard, &descendant.amount)
    }

    /// Confirms the content of `momentum` and returns the resulting diff.
    #[instrument(target = "momentum", skip_all, fields(height = momentum.height, blocks = momentum.content.len()))]
    pub fn apply_momentum(&self, store: &dyn ReadStore, momentum: &Momentum) -> VmResult<Changes> {
        let mut work = Overlay::new(store);
        if momentum.chain_identifier != self.chain_identifier {
            return Err(VmError::ChainIdentifierMismatch {
                expected: self.chain_identifier,
                actual: momentum.chain_identifier,
            });
        }
        if !momentum.hash_matches() {
            return Err(VmError::invalid_momentum("hash does not match content"));
        }
        let frontier = ledger::frontier_momentum(&work)?
            .ok_or_else(|| VmError::invalid_momentum("genesis momentum missing"))?;
        if momentum.height != frontier.height + 1 {
            return Err(VmError::invalid_momentum(format!(
                "height {} does not follow {}",
                momentum.height, frontier.height
            )));
        }
        if momentum.previous_hash != frontier.hash {
            return Err(VmError::invalid_momentum("previous hash does not match frontier"));
        }
        if momentum.timestamp <= frontier.timestamp {
            return Err(VmError::invalid_momentum(format!(
                "timestamp {} not after {}",
                momentum.timestamp, frontier.timestamp
            )));
        }

        for header in &momentum.content {
            confirm(&mut work, header, momentum.height)?;
        }
        ledger::put_momentum(&mut work, momentum)?;
        debug!(target: "momentum", hash = %momentum.hash, "momentum applied");
        Ok(work.into_changes())
    }

    /// Seeds balances and fusions and stores the genesis momentum.
    #[instrument(target = "momentum", skip_all, fields(balances = genesis.balances.len(), fusions = genesis.fusions.len()))]
    pub fn apply_genesis(&self, store: &dyn ReadStore, genesis: &Genesis) -> VmResult<(Momentum, Changes)> {
        let mut work = Overlay::new(store);
        if ledger::frontier_momentum(&work)?.is_some() {
            return Err(VmError::GenesisAlreadyApplied);
        }
        let momentum = Momentum::next(
            self.chain_identifier,
            HashHeight::default(),
            genesis.timestamp,
            Vec::new(),
        );

        for balance in &genesis.balances {
            account::add_balance(&mut work, &balance.address, &balance.token_standard, &balance.amount)?;
        }
        let acknowledged = AcknowledgedMomentum {
            hash: momentum.hash,
            height: momentum.height,
            timestamp: momentum.timestamp,
        };
        for (index, fusion) in genesis.fusions.iter().enumerate() {
            let entry = FusionEntry {
                id: Hash::digest_parts(&[&b"genesis-fusion"[..], &(index as u64).to_be_bytes()[..]]),
                owner: fusion.owner,
                amount: fusion.amount.clone(),
                expiration_height: momentum.height + FUSE_EXPIRATION_HEIGHT,
                beneficiary: fusion.beneficiary,
            };
            plasma_contract::genesis_fusion(&mut work, self.chain_identifier, acknowledged, &entry)?;
        }
        ledger::put_momentum(&mut work, &momentum)?;
        debug!(target: "momentum", hash = %momentum.hash, "genesis applied");
        Ok((momentum, work.into_changes()))
    }
}

/// Height and previous hash the next block of `address` must carry.
pub(crate) fn next_position<S: ReadStore + ?Sized>(store: &S, address: &Address) -> VmResult<(u64, Hash)> {
    Ok(match account::frontier(store, address)? {
        Some(frontier) => (frontier.height + 1, frontier.hash),
        None => (1, Hash::zero()),
    })
}

fn acknowledged_momentum<S: ReadStore + ?Sized>(
    store: &S,
    acknowledged: &HashHeight,
) -> VmResult<AcknowledgedMomentum> {
    let momentum = ledger::momentum_by_hash(store, &acknowledged.hash)?
        .filter(|momentum| momentum.height == acknowledged.height)
        .ok_or(VmError::MomentumNotFound)?;
    Ok(AcknowledgedMomentum {
        hash: momentum.hash,
        height: momentum.height,
        timestamp: momentum.timestamp,
    })
}

fn apply_user_receive<W: WriteStore + ?Sized>(work: &mut W, block: &AccountBlock) -> VmResult<()> {
    let send = ledger::block(&*work, &block.from_block_hash)?
        .filter(AccountBlock::is_send)
        .ok_or(VmError::SendBlockNotFound)?;
    if send.to_address != block.address {
        return Err(VmError::ReceiverMismatch);
    }
    if ledger::received_by(&*work, &send.hash)?.is_some() {
        return Err(VmError::AlreadyReceived);
    }
    ledger::mark_received(work, &send.hash, &block.hash)?;
    account::add_balance(work, &block.address, &send.token_standard, &send.amount)
}

/// Returns the full amount of a failed call to its sender.
fn refund<W: WriteStore + ?Sized>(
    work: &mut W,
    send: &AccountBlock,
    chain_identifier: u64,
) -> VmResult<Vec<AccountBlock>> {
    if send.amount.is_zero() {
        return Ok(Vec::new());
    }
    let contract = send.to_address;
    account::add_balance(work, &contract, &send.token_standard, &send.amount)?;
    let mut refund = AccountBlock::template(BlockType::ContractSend, chain_identifier);
    refund.address = contract;
    refund.to_address = send.address;
    refund.token_standard = send.token_standard;
    refund.amount = send.amount.clone();
    account::sub_balance(work, &contract, &refund.token_standard, &refund.amount)?;
    Ok(vec![refund])
}

fn record_block<W: WriteStore + ?Sized>(work: &mut W, block: &AccountBlock) -> VmResult<()> {
    ledger::put_block(work, block)?;
    account::set_frontier(work, &block.address, &block.hash_height())?;
    let chain_plasma = account::chain_plasma(&*work, &block.address)?;
    account::put_height_record(
        work,
        &block.address,
        block.height,
        &HeightRecord {
            hash: block.hash,
            chain_plasma,
        },
    )?;
    ledger::push_unconfirmed(work, &block.hash)
}

fn confirm<W: WriteStore + ?Sized>(work: &mut W, header: &AccountHeader, momentum_height: u64) -> VmResult<()> {
    let hash = header.hash_height.hash;
    let block = ledger::block(&*work, &hash)?.ok_or_else(|| VmError::BlockNotFound(hash.to_string()))?;
    if block.address != header.address || block.height != header.hash_height.height {
        return Err(VmError::invalid_momentum(format!("header of {hash} does not match the block")));
    }
    if ledger::confirmation(&*work, &hash)?.is_some() {
        return Err(VmError::AlreadyConfirmed(hash.to_string()));
    }
    if block.height > 1 {
        let previous = account::height_record(&*work, &block.address, block.height - 1)?
            .ok_or_else(|| VmError::internal(format!("height record {} of {} missing", block.height - 1, block.address)))?;
        if ledger::confirmation(&*work, &previous.hash)?.is_none() {
            return Err(VmError::PredecessorNotConfirmed(hash.to_string()));
        }
    }
    let record = account::height_record(&*work, &block.address, block.height)?
        .ok_or_else(|| VmError::internal(format!("height record {} of {} missing", block.height, block.address)))?;

    ledger::set_confirmation(work, &hash, momentum_height)?;
    ledger::set_committed_plasma(work, &block.address, record.chain_plasma)?;
    ledger::remove_unconfirmed(work, &hash)
}
