//! Records handed back to the caller after a successful run.

use momentum_primitives::{AccountBlock, Momentum};
use momentum_storage::Changes;
use serde::{Deserialize, Serialize};

/// An account block together with the state diff it causes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBlockTransaction {
    pub block: AccountBlock,
    pub changes: Changes,
}

/// A momentum together with the state diff it causes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MomentumTransaction {
    pub momentum: Momentum,
    pub changes: Changes,
}
