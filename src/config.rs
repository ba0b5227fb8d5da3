//! Node configuration loaded from TOML.
//!
//! ```toml
//! [chain]
//! identifier = 1
//!
//! [genesis]
//! timestamp = 1000
//!
//! [[genesis.balances]]
//! address = "00..."
//! token_standard = "zts..."
//! amount = "100000000000"
//!
//! [logging]
//! level = "warn"
//! engine_level = "debug"
//! format = "compact"
//! ```

use std::fs;
use std::path::Path;

use momentum_primitives::DEFAULT_CHAIN_IDENTIFIER;
use momentum_vm::Genesis;
use serde::{Deserialize, Serialize};

use crate::error::{NodeError, NodeResult};
use crate::logging::LogConfig;

/// Complete node configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub chain: ChainConfig,
    pub genesis: Genesis,
    pub logging: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Identifier every block and momentum must carry.
    pub identifier: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            identifier: DEFAULT_CHAIN_IDENTIFIER,
        }
    }
}

impl NodeConfig {
    pub fn load(path: &Path) -> NodeResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> NodeResult<Self> {
        toml::from_str(text).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> NodeResult<String> {
        toml::to_string(self).map_err(|e| NodeError::Config(e.to_string()))
    }
}
