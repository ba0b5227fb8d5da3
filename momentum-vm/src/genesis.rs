//! Initial ledger state applied before the first momentum.

use momentum_primitives::serde_helpers;
use momentum_primitives::{Address, Amount, TokenStandard};
use serde::{Deserialize, Serialize};

/// Balances and fusions present at momentum height 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Genesis {
    /// Seconds since the Unix epoch of the genesis momentum.
    pub timestamp: u64,
    pub balances: Vec<GenesisBalance>,
    pub fusions: Vec<GenesisFusion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisBalance {
    pub address: Address,
    pub token_standard: TokenStandard,
    #[serde(with = "serde_helpers::amount")]
    pub amount: Amount,
}

/// QSR already fused at genesis; locked in the plasma contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisFusion {
    pub owner: Address,
    pub beneficiary: Address,
    #[serde(with = "serde_helpers::amount")]
    pub amount: Amount,
}
