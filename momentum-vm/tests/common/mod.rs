#![allow(dead_code)]

use momentum_primitives::{
    AccountBlock, Address, Amount, BlockType, Hash, KeyPair, Momentum, TokenStandard, ONE_COIN,
    QSR_TOKEN_STANDARD, ZNN_TOKEN_STANDARD,
};
use momentum_storage::{MemoryStore, WriteStore};
use momentum_vm::state::{account, ledger};
use momentum_vm::{Genesis, GenesisBalance, GenesisFusion, Supervisor, VmResult};

pub const CHAIN: u64 = 1;

pub fn alice() -> KeyPair {
    KeyPair::from_seed([1u8; 32])
}

pub fn bob() -> KeyPair {
    KeyPair::from_seed([2u8; 32])
}

pub fn carol() -> KeyPair {
    KeyPair::from_seed([3u8; 32])
}

pub fn producer() -> KeyPair {
    KeyPair::from_seed([9u8; 32])
}

pub fn coins(count: u64) -> Amount {
    Amount::from(count * ONE_COIN)
}

/// Alice holds 1000 ZNN and 1000 QSR; 100 QSR is fused for each of Alice and Bob.
pub fn genesis() -> Genesis {
    Genesis {
        timestamp: 1_000,
        balances: vec![
            GenesisBalance {
                address: alice().address(),
                token_standard: ZNN_TOKEN_STANDARD,
                amount: coins(1_000),
            },
            GenesisBalance {
                address: alice().address(),
                token_standard: QSR_TOKEN_STANDARD,
                amount: coins(1_000),
            },
        ],
        fusions: vec![
            GenesisFusion {
                owner: alice().address(),
                beneficiary: alice().address(),
                amount: coins(100),
            },
            GenesisFusion {
                owner: alice().address(),
                beneficiary: bob().address(),
                amount: coins(100),
            },
        ],
    }
}

/// A supervisor plus the store it is driven against.
pub struct TestLedger {
    pub supervisor: Supervisor,
    pub store: MemoryStore,
    clock: u64,
}

impl TestLedger {
    pub fn new() -> Self {
        Self::with_supervisor(Supervisor::with_global_registry(CHAIN).unwrap())
    }

    pub fn with_supervisor(supervisor: Supervisor) -> Self {
        let mut store = MemoryStore::new();
        let transaction = supervisor.bootstrap(&store, &genesis()).unwrap();
        store.apply(&transaction.changes).unwrap();
        Self {
            supervisor,
            store,
            clock: 1_000,
        }
    }

    pub fn send_template(to: Address, token: TokenStandard, amount: Amount, data: Vec<u8>) -> AccountBlock {
        let mut template = AccountBlock::template(BlockType::UserSend, CHAIN);
        template.to_address = to;
        template.token_standard = token;
        template.amount = amount;
        template.data = data;
        template
    }

    pub fn try_send(
        &mut self,
        key: &KeyPair,
        to: Address,
        token: TokenStandard,
        amount: Amount,
        data: Vec<u8>,
    ) -> VmResult<AccountBlock> {
        let template = Self::send_template(to, token, amount, data);
        let transaction = self
            .supervisor
            .generate_from_template(&self.store, &template, key)?;
        self.store.apply(&transaction.changes).unwrap();
        Ok(transaction.block)
    }

    pub fn send(
        &mut self,
        key: &KeyPair,
        to: Address,
        token: TokenStandard,
        amount: Amount,
        data: Vec<u8>,
    ) -> AccountBlock {
        self.try_send(key, to, token, amount, data).unwrap()
    }

    pub fn receive(&mut self, key: &KeyPair, send_hash: Hash) -> VmResult<AccountBlock> {
        let mut template = AccountBlock::template(BlockType::UserReceive, CHAIN);
        template.from_block_hash = send_hash;
        let transaction = self
            .supervisor
            .generate_from_template(&self.store, &template, key)?;
        self.store.apply(&transaction.changes).unwrap();
        Ok(transaction.block)
    }

    pub fn auto_receive(&mut self, send_hash: Hash) -> VmResult<AccountBlock> {
        let transaction = self.supervisor.generate_auto_receive(&self.store, &send_hash)?;
        self.store.apply(&transaction.changes).unwrap();
        Ok(transaction.block)
    }

    pub fn momentum(&mut self) -> Momentum {
        self.clock += 10;
        let transaction = self
            .supervisor
            .generate_momentum(&self.store, self.clock, &producer())
            .unwrap();
        self.store.apply(&transaction.changes).unwrap();
        transaction.momentum
    }

    pub fn momentum_height(&self) -> u64 {
        ledger::frontier_momentum(&self.store).unwrap().unwrap().height
    }

    pub fn balance(&self, address: Address, token: TokenStandard) -> Amount {
        account::balance(&self.store, &address, &token).unwrap()
    }
}
