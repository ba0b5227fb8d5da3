//! # Momentum Node
//!
//! Embeds the momentum execution engine behind a small synchronous facade.
//!
//! - [`config`]: TOML node configuration (chain identifier, genesis, logging)
//! - [`logging`]: `tracing-subscriber` setup
//! - [`node`]: the [`Node`] facade serialising access to the store
//!
//! ## Example
//!
//! ```rust
//! use momentum_node::{Node, NodeConfig};
//!
//! let node = Node::new(&NodeConfig::default()).unwrap();
//! assert_eq!(node.frontier_momentum().unwrap().unwrap().height, 1);
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod node;

pub use config::{ChainConfig, NodeConfig};
pub use error::{NodeError, NodeResult};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use node::Node;
