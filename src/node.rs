//! In-process ledger node.
//!
//! Owns the store and funnels every operation through the supervisor while
//! holding the store lock, so concurrent callers observe a single writer.

use momentum_primitives::{AccountBlock, Address, Amount, Hash, KeyPair, Momentum, TokenStandard};
use momentum_storage::{MemoryStore, WriteStore};
use momentum_vm::state::{account, ledger};
use momentum_vm::{available_plasma, AccountBlockTransaction, MomentumTransaction, Supervisor};
use parking_lot::Mutex;
use tracing::info;

use crate::config::NodeConfig;
use crate::error::NodeResult;

pub struct Node {
    supervisor: Supervisor,
    store: Mutex<MemoryStore>,
}

impl Node {
    /// Creates a node over an empty store and applies the configured genesis.
    pub fn new(config: &NodeConfig) -> NodeResult<Self> {
        let supervisor = Supervisor::with_global_registry(config.chain.identifier)?;
        let mut store = MemoryStore::new();
        let genesis = supervisor.bootstrap(&store, &config.genesis)?;
        store.apply(&genesis.changes)?;
        info!(
            target: "momentum",
            chain = config.chain.identifier,
            hash = %genesis.momentum.hash,
            "genesis applied"
        );
        Ok(Self {
            supervisor,
            store: Mutex::new(store),
        })
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    /// Validates and applies an externally produced block.
    pub fn submit_block(&self, block: &AccountBlock) -> NodeResult<AccountBlockTransaction> {
        let mut store = self.store.lock();
        let transaction = self.supervisor.apply_block(&*store, block)?;
        store.apply(&transaction.changes)?;
        Ok(transaction)
    }

    /// Completes `template` for `key`, then applies it.
    pub fn submit_template(&self, template: &AccountBlock, key: &KeyPair) -> NodeResult<AccountBlockTransaction> {
        let mut store = self.store.lock();
        let transaction = self
            .supervisor
            .generate_from_template(&*store, template, key)?;
        store.apply(&transaction.changes)?;
        Ok(transaction)
    }

    pub fn auto_receive(&self, send_hash: &Hash) -> NodeResult<AccountBlockTransaction> {
        let mut store = self.store.lock();
        let transaction = self.supervisor.generate_auto_receive(&*store, send_hash)?;
        store.apply(&transaction.changes)?;
        Ok(transaction)
    }

    /// Generates receives for every pending contract call, including calls
    /// queued by the receives themselves.
    pub fn receive_all(&self) -> NodeResult<Vec<AccountBlockTransaction>> {
        let mut store = self.store.lock();
        let addresses = self.supervisor.machine().registry().addresses();
        let mut receipts = Vec::new();
        loop {
            let before = receipts.len();
            for address in &addresses {
                while let Some(send_hash) = account::sequencer_peek(&*store, address)? {
                    let transaction = self.supervisor.generate_auto_receive(&*store, &send_hash)?;
                    store.apply(&transaction.changes)?;
                    receipts.push(transaction);
                }
            }
            if receipts.len() == before {
                break;
            }
        }
        Ok(receipts)
    }

    pub fn produce_momentum(&self, timestamp: u64, key: &KeyPair) -> NodeResult<MomentumTransaction> {
        let mut store = self.store.lock();
        let transaction = self.supervisor.generate_momentum(&*store, timestamp, key)?;
        store.apply(&transaction.changes)?;
        info!(
            target: "momentum",
            height = transaction.momentum.height,
            blocks = transaction.momentum.content.len(),
            "momentum produced"
        );
        Ok(transaction)
    }

    pub fn frontier_momentum(&self) -> NodeResult<Option<Momentum>> {
        Ok(ledger::frontier_momentum(&*self.store.lock())?)
    }

    pub fn account_block(&self, hash: &Hash) -> NodeResult<Option<AccountBlock>> {
        Ok(ledger::block(&*self.store.lock(), hash)?)
    }

    pub fn balance(&self, address: &Address, token: &TokenStandard) -> NodeResult<Amount> {
        Ok(account::balance(&*self.store.lock(), address, token)?)
    }

    pub fn available_plasma(&self, address: &Address) -> NodeResult<u64> {
        Ok(available_plasma(&*self.store.lock(), address)?)
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("chain", &self.supervisor.machine().chain_identifier())
            .finish_non_exhaustive()
    }
}
