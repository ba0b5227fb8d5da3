//! Property-based tests for momentum-primitives
//!
//! These tests use proptest to verify:
//! - Text forms of hashes, addresses and token standards parse back
//! - Signatures verify only for the signed message
//! - Block hashes react to payload changes

use momentum_primitives::{
    AccountBlock, Address, BlockType, Hash, KeyPair, TokenStandard, verify_signature,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_hash_text_form(bytes in any::<[u8; 32]>()) {
        let hash = Hash::from_array(bytes);
        let parsed: Hash = hash.to_string().parse().unwrap();
        prop_assert_eq!(parsed, hash);
    }

    #[test]
    fn test_address_text_form(bytes in any::<[u8; 20]>()) {
        let address = Address::from_bytes(&bytes).unwrap();
        let parsed: Address = address.to_string().parse().unwrap();
        prop_assert_eq!(parsed, address);
    }

    #[test]
    fn test_token_standard_text_form(bytes in any::<[u8; 10]>()) {
        let zts = TokenStandard::from_array(bytes);
        let text = zts.to_string();
        prop_assert!(text.starts_with("zts"));
        let parsed: TokenStandard = text.parse().unwrap();
        prop_assert_eq!(parsed, zts);
    }

    #[test]
    fn test_user_addresses_are_not_embedded(seed in any::<[u8; 32]>()) {
        let key = KeyPair::from_seed(seed);
        prop_assert!(key.address().is_user());
        prop_assert!(!key.address().is_embedded());
    }

    #[test]
    fn test_sign_then_verify(seed in any::<[u8; 32]>(), message in any::<Vec<u8>>()) {
        let key = KeyPair::from_seed(seed);
        let signature = key.sign(&message);
        prop_assert!(verify_signature(&key.public_key(), &message, &signature).is_ok());

        let mut tampered = message.clone();
        tampered.push(0);
        prop_assert!(verify_signature(&key.public_key(), &tampered, &signature).is_err());
    }

    #[test]
    fn test_block_hash_tracks_data(data in prop::collection::vec(any::<u8>(), 0..256), extra in any::<u8>()) {
        let mut block = AccountBlock::template(BlockType::UserSend, 1);
        block.height = 1;
        block.data = data;
        let before = block.compute_hash();
        block.data.push(extra);
        prop_assert_ne!(before, block.compute_hash());
    }

    #[test]
    fn test_derived_token_standards_differ(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
        prop_assume!(a != b);
        prop_assert_ne!(
            TokenStandard::derive(&Hash::from_array(a)),
            TokenStandard::derive(&Hash::from_array(b))
        );
    }
}

#[test]
fn test_block_bincode_record() {
    let key = KeyPair::from_seed([9u8; 32]);
    let mut block = AccountBlock::template(BlockType::UserSend, 1);
    block.address = key.address();
    block.height = 1;
    block.amount = 12_345u64.into();
    block.hash = block.compute_hash();
    block.sign(&key);

    let bytes = bincode::serialize(&block).unwrap();
    let back: AccountBlock = bincode::deserialize(&bytes).unwrap();
    assert_eq!(back, block);
    assert!(back.verify_signature().is_ok());
}
