mod common;

use common::*;
use momentum_primitives::{AccountBlock, Address, Amount, BlockType, ZNN_TOKEN_STANDARD};
use momentum_vm::constants::MAX_PLASMA_FOR_ACCOUNT_BLOCK;
use momentum_vm::{
    difficulty_to_plasma, fused_amount_to_plasma, get_base_plasma_for_account_block,
    get_difficulty_for_plasma, pow, EmbeddedRegistry, PlasmaTable, VmError, TOKEN_CONTRACT,
};
use proptest::prelude::*;

fn user_send(data_len: usize) -> AccountBlock {
    let mut block = AccountBlock::template(BlockType::UserSend, CHAIN);
    block.address = alice().address();
    block.to_address = bob().address();
    block.data = vec![7u8; data_len];
    block
}

fn base_plasma(block: &AccountBlock) -> Result<u64, VmError> {
    let registry = EmbeddedRegistry::global().unwrap();
    get_base_plasma_for_account_block(&registry, &PlasmaTable::default(), block)
}

proptest! {
    #[test]
    fn test_difficulty_to_plasma_monotone(a in any::<u64>(), b in any::<u64>()) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(difficulty_to_plasma(low) <= difficulty_to_plasma(high));
        prop_assert!(difficulty_to_plasma(high) <= MAX_PLASMA_FOR_ACCOUNT_BLOCK);
    }

    #[test]
    fn test_fused_plasma_monotone_and_saturating(a in any::<u128>(), b in any::<u128>()) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let low_plasma = fused_amount_to_plasma(&Amount::from(low));
        let high_plasma = fused_amount_to_plasma(&Amount::from(high));
        prop_assert!(low_plasma <= high_plasma);
        prop_assert!(high_plasma <= 10_500_000);
    }

    #[test]
    fn test_difficulty_inverts_plasma(plasma in 0u64..=MAX_PLASMA_FOR_ACCOUNT_BLOCK) {
        let difficulty = get_difficulty_for_plasma(plasma).unwrap();
        prop_assert_eq!(difficulty_to_plasma(difficulty), plasma);
    }

    #[test]
    fn test_user_send_cost_linear_in_payload(len in 0usize..=16_384) {
        prop_assert_eq!(base_plasma(&user_send(len)).unwrap(), 21_000 + 68 * len as u64);
    }
}

#[test]
fn test_payload_of_hundred_bytes() {
    assert_eq!(base_plasma(&user_send(100)).unwrap(), 21_000 + 100 * 68);
}

#[test]
fn test_oversized_payload_rejected() {
    assert_eq!(base_plasma(&user_send(16_385)), Err(VmError::PayloadTooBig));
}

#[test]
fn test_receive_and_contract_costs() {
    let mut receive = AccountBlock::template(BlockType::UserReceive, CHAIN);
    receive.address = alice().address();
    assert_eq!(base_plasma(&receive).unwrap(), 21_000);

    let mut contract_send = AccountBlock::template(BlockType::ContractSend, CHAIN);
    contract_send.address = TOKEN_CONTRACT;
    contract_send.to_address = alice().address();
    assert_eq!(base_plasma(&contract_send).unwrap(), 0);

    let mut unknown = user_send(4);
    unknown.to_address = Address::embedded(b"unknown");
    assert_eq!(base_plasma(&unknown), Err(VmError::ContractDoesntExist));
}

#[test]
fn test_double_withdraw_difficulty() {
    assert_eq!(get_difficulty_for_plasma(94_500).unwrap(), 141_750_000);
}

#[test]
fn test_unfused_account_lacks_plasma() {
    let ledger = TestLedger::new();
    let template = TestLedger::send_template(alice().address(), ZNN_TOKEN_STANDARD, coins(1), Vec::new());
    assert_eq!(
        ledger
            .supervisor
            .generate_from_template(&ledger.store, &template, &carol())
            .map(|transaction| transaction.block),
        Err(VmError::NotEnoughPlasma {
            fused: 21_000,
            available: 0
        })
    );
}

#[test]
fn test_fused_plasma_exhausts_within_a_momentum() {
    let mut ledger = TestLedger::new();
    // 210_000 plasma covers ten simple sends.
    for _ in 0..10 {
        ledger.send(&alice(), bob().address(), ZNN_TOKEN_STANDARD, coins(1), Vec::new());
    }
    assert_eq!(
        ledger
            .try_send(&alice(), bob().address(), ZNN_TOKEN_STANDARD, coins(1), Vec::new())
            .map(|block| block.hash),
        Err(VmError::NotEnoughPlasma {
            fused: 21_000,
            available: 0
        })
    );
    ledger.momentum();
    assert!(ledger
        .try_send(&alice(), bob().address(), ZNN_TOKEN_STANDARD, coins(1), Vec::new())
        .is_ok());
}

fn generated(ledger: &TestLedger, difficulty: u64) -> AccountBlock {
    let mut template = TestLedger::send_template(bob().address(), ZNN_TOKEN_STANDARD, coins(1), Vec::new());
    template.difficulty = difficulty;
    ledger
        .supervisor
        .generate_from_template(&ledger.store.clone(), &template, &alice())
        .unwrap()
        .block
}

fn reseal(block: &mut AccountBlock) {
    block.hash = block.compute_hash();
    block.sign(&alice());
}

#[test]
fn test_declared_plasma_must_match() {
    let ledger = TestLedger::new();
    let mut block = generated(&ledger, 0);
    block.base_plasma = 1;
    reseal(&mut block);
    assert!(matches!(
        ledger.supervisor.apply_block(&ledger.store, &block),
        Err(VmError::PlasmaMismatch { .. })
    ));
}

#[test]
fn test_block_plasma_ceiling() {
    let ledger = TestLedger::new();
    let mut block = generated(&ledger, 0);
    block.fused_plasma = MAX_PLASMA_FOR_ACCOUNT_BLOCK + 1;
    block.total_plasma = MAX_PLASMA_FOR_ACCOUNT_BLOCK + 1;
    reseal(&mut block);
    assert_eq!(
        ledger.supervisor.apply_block(&ledger.store, &block).map(|_| ()),
        Err(VmError::BlockPlasmaLimitReached {
            total: MAX_PLASMA_FOR_ACCOUNT_BLOCK + 1
        })
    );
}

#[test]
fn test_invalid_nonce_rejected() {
    let ledger = TestLedger::new();
    let mut block = generated(&ledger, 15_000);
    let data_hash = block.pow_data_hash();
    let bad = (0u64..)
        .map(u64::to_be_bytes)
        .find(|nonce| !pow::check_nonce(&data_hash, nonce, block.difficulty))
        .unwrap();
    block.nonce = bad;
    reseal(&mut block);
    assert_eq!(
        ledger.supervisor.apply_block(&ledger.store, &block).map(|_| ()),
        Err(VmError::InvalidNonce)
    );
}
