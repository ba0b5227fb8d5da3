use std::fs;
use std::sync::Arc;
use std::thread;

use momentum_abi::Value;
use momentum_node::{LogFormat, Node, NodeConfig, NodeError};
use momentum_primitives::{
    AccountBlock, Amount, BlockType, KeyPair, ONE_COIN, QSR_TOKEN_STANDARD, ZNN_TOKEN_STANDARD,
};
use momentum_vm::embedded::plasma;
use momentum_vm::{Genesis, GenesisBalance, GenesisFusion, VmError, PLASMA_CONTRACT};
use tempfile::TempDir;

fn alice() -> KeyPair {
    KeyPair::from_seed([1u8; 32])
}

fn carol() -> KeyPair {
    KeyPair::from_seed([3u8; 32])
}

fn coins(count: u64) -> Amount {
    Amount::from(count * ONE_COIN)
}

fn funded_config() -> NodeConfig {
    let mut config = NodeConfig::default();
    config.genesis = Genesis {
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
        fusions: vec![GenesisFusion {
            owner: alice().address(),
            beneficiary: alice().address(),
            amount: coins(100),
        }],
    };
    config
}

fn transfer(to: &KeyPair, amount: Amount) -> AccountBlock {
    let mut template = AccountBlock::template(BlockType::UserSend, 1);
    template.to_address = to.address();
    template.token_standard = ZNN_TOKEN_STANDARD;
    template.amount = amount;
    template
}

#[test]
fn test_node_from_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("node.toml");
    let text = format!(
        r#"
[chain]
identifier = 7

[genesis]
timestamp = 5000

[[genesis.balances]]
address = "{}"
token_standard = "{}"
amount = "500"

[logging]
level = "debug"
format = "json"
"#,
        alice().address(),
        ZNN_TOKEN_STANDARD
    );
    fs::write(&path, text).unwrap();

    let config = NodeConfig::load(&path).unwrap();
    assert_eq!(config.chain.identifier, 7);
    assert_eq!(config.logging.format, LogFormat::Json);

    let node = Node::new(&config).unwrap();
    let genesis = node.frontier_momentum().unwrap().unwrap();
    assert_eq!(genesis.height, 1);
    assert_eq!(genesis.chain_identifier, 7);
    assert_eq!(genesis.timestamp, 5_000);
    assert_eq!(
        node.balance(&alice().address(), &ZNN_TOKEN_STANDARD).unwrap(),
        Amount::from(500u64)
    );
    assert_eq!(
        node.balance(&alice().address(), &QSR_TOKEN_STANDARD).unwrap(),
        Amount::from(0u64)
    );
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    let result = NodeConfig::load(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(NodeError::Io(_))));
}

#[test]
fn test_config_toml_roundtrip() {
    let config = funded_config();
    let text = config.to_toml_string().unwrap();
    assert_eq!(NodeConfig::from_toml_str(&text).unwrap(), config);
}

#[test]
fn test_wrong_chain_rejected() {
    let node = Node::new(&funded_config()).unwrap();
    let mut template = transfer(&carol(), coins(1));
    template.chain_identifier = 2;
    // the supervisor stamps its own chain identifier onto templates
    let transaction = node.submit_template(&template, &alice()).unwrap();
    assert_eq!(transaction.block.chain_identifier, 1);

    let mut foreign = transaction.block.clone();
    foreign.chain_identifier = 2;
    assert!(matches!(node.submit_block(&foreign), Err(NodeError::Vm(_))));
}

#[test]
fn test_concurrent_submissions_serialise() {
    let node = Arc::new(Node::new(&funded_config()).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let node = Arc::clone(&node);
            thread::spawn(move || {
                node.submit_template(&transfer(&carol(), coins(1)), &alice())
                    .unwrap()
                    .block
                    .height
            })
        })
        .collect();

    let mut heights: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    heights.sort_unstable();
    assert_eq!(heights, vec![1, 2, 3, 4]);
    assert_eq!(
        node.balance(&alice().address(), &ZNN_TOKEN_STANDARD).unwrap(),
        coins(996)
    );
}

#[test]
fn test_receive_all_processes_fusion() {
    let node = Node::new(&funded_config()).unwrap();
    assert_eq!(node.available_plasma(&carol().address()).unwrap(), 0);

    let data = plasma::schema()
        .unwrap()
        .pack_method("Fuse", &[Value::Address(carol().address())])
        .unwrap();
    let mut template = AccountBlock::template(BlockType::UserSend, 1);
    template.to_address = PLASMA_CONTRACT;
    template.token_standard = QSR_TOKEN_STANDARD;
    template.amount = coins(10);
    template.data = data;
    node.submit_template(&template, &alice()).unwrap();

    let receipts = node.receive_all().unwrap();
    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0].block.address, PLASMA_CONTRACT);
    assert_eq!(node.available_plasma(&carol().address()).unwrap(), 21_000);
    assert!(node.receive_all().unwrap().is_empty());
}

#[test]
fn test_momentum_confirms_blocks() {
    let node = Node::new(&funded_config()).unwrap();
    let send = node
        .submit_template(&transfer(&carol(), coins(5)), &alice())
        .unwrap();
    let momentum = node.produce_momentum(2_000, &KeyPair::from_seed([9u8; 32])).unwrap();
    assert_eq!(momentum.momentum.height, 2);
    assert_eq!(momentum.momentum.content.len(), 1);
    assert_eq!(momentum.momentum.content[0].hash_height.hash, send.block.hash);
    assert!(node.account_block(&send.block.hash).unwrap().is_some());

    assert!(matches!(
        node.auto_receive(&send.block.hash),
        Err(NodeError::Vm(VmError::NotContractAddress))
    ));
}
