//! # Momentum VM
//!
//! Execution engine of the momentum ledger.
//!
//! Accounts own independent chains of account blocks. A send debits the
//! sender and, when it targets an embedded contract, queues a call on that
//! contract's receive sequencer. The contract's receive block is generated
//! deterministically by the engine, so any node can regenerate it and compare
//! hashes. Momentums confirm account blocks in batches.
//!
//! Layers, bottom up:
//!
//! - [`state`]: key layout and typed accessors over a [`momentum_storage::ReadStore`]
//! - [`plasma`]: block costs, PoW and fused plasma admission
//! - [`embedded`]: the immutable registry of built-in contracts
//! - [`machine`]: block, receive and momentum transitions producing diffs
//! - [`supervisor`]: fault boundary, template completion and signing
//!
//! ## Example
//!
//! ```rust
//! use momentum_primitives::{Address, Amount, ZNN_TOKEN_STANDARD};
//! use momentum_storage::{MemoryStore, WriteStore};
//! use momentum_vm::{Genesis, GenesisBalance, Supervisor};
//!
//! let supervisor = Supervisor::with_global_registry(1).unwrap();
//! let mut store = MemoryStore::new();
//! let genesis = Genesis {
//!     timestamp: 1_000,
//!     balances: vec![GenesisBalance {
//!         address: Address::from_public_key(&[1u8; 32]),
//!         token_standard: ZNN_TOKEN_STANDARD,
//!         amount: Amount::from(100u64),
//!     }],
//!     fusions: Vec::new(),
//! };
//! let transaction = supervisor.bootstrap(&store, &genesis).unwrap();
//! store.apply(&transaction.changes).unwrap();
//! assert_eq!(transaction.momentum.height, 1);
//! ```

pub mod constants;
pub mod embedded;
pub mod error;
pub mod genesis;
pub mod machine;
pub mod plasma;
pub mod pow;
pub mod state;
pub mod supervisor;
pub mod transaction;

pub use embedded::{
    AcknowledgedMomentum, EmbeddedRegistry, Method, MethodContext, RegistryBuilder, PLASMA_CONTRACT,
    TOKEN_CONTRACT,
};
pub use error::{VmError, VmResult};
pub use genesis::{Genesis, GenesisBalance, GenesisFusion};
pub use machine::Machine;
pub use plasma::{
    available_plasma, difficulty_to_plasma, fused_amount_to_plasma, get_base_plasma_for_account_block,
    get_difficulty_for_plasma, PlasmaTable,
};
pub use supervisor::{validate_block_structure, validate_momentum_structure, Supervisor};
pub use transaction::{AccountBlockTransaction, MomentumTransaction};
