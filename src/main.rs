//! Command-line entry point of the momentum node.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use momentum_node::{init_logging, Node, NodeConfig};
use momentum_vm::EmbeddedRegistry;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "momentum-node", version, about = "Momentum ledger node")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "MOMENTUM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply the configured genesis and print the genesis momentum as JSON
    Genesis,
    /// List the method selectors of every embedded contract
    Selectors,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => NodeConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => NodeConfig::default(),
    };
    init_logging(&config.logging)?;

    match cli.command {
        Command::Genesis => {
            let node = Node::new(&config)?;
            let momentum = node
                .frontier_momentum()?
                .context("genesis momentum missing after bootstrap")?;
            info!(hash = %momentum.hash, "genesis ready");
            println!("{}", serde_json::to_string_pretty(&momentum)?);
        }
        Command::Selectors => {
            let registry = EmbeddedRegistry::global()?;
            for address in registry.addresses() {
                let Some(schema) = registry.schema(&address) else {
                    continue;
                };
                for method in schema.methods() {
                    println!("{address} {} {}", hex::encode(method.selector()), method.signature());
                }
            }
        }
    }
    Ok(())
}
