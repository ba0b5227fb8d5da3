//! Property-based tests for the ABI codec.
//!
//! These tests use proptest to verify:
//! - Unpacking a packed payload yields the original values
//! - Encoded lengths are word multiples (plus the selector for methods)
//! - Selectors depend only on the signature

use momentum_abi::{AbiSchema, AbiType, Value, SELECTOR_SIZE, WORD_SIZE};
use momentum_primitives::{Address, Hash, TokenStandard};
use num_bigint::BigInt;
use proptest::prelude::*;

const SCHEMA: &str = r#"[
    {"type": "function", "name": "Everything", "inputs": [
        {"name": "count", "type": "uint64"},
        {"name": "delta", "type": "int128"},
        {"name": "flag", "type": "bool"},
        {"name": "label", "type": "string"},
        {"name": "blob", "type": "bytes"},
        {"name": "tag", "type": "bytes4"},
        {"name": "owner", "type": "address"},
        {"name": "id", "type": "hash"},
        {"name": "zts", "type": "tokenStandard"},
        {"name": "amounts", "type": "uint256[]"},
        {"name": "names", "type": "string[2]"}
    ]},
    {"type": "variable", "name": "entry", "inputs": [
        {"name": "amount", "type": "uint256"},
        {"name": "owners", "type": "address[]"}
    ]}
]"#;

fn schema() -> AbiSchema {
    AbiSchema::from_json(SCHEMA).unwrap()
}

fn arb_args() -> impl Strategy<Value = Vec<Value>> {
    (
        any::<u64>(),
        any::<i64>(),
        any::<bool>(),
        ".{0,80}",
        prop::collection::vec(any::<u8>(), 0..100),
        any::<[u8; 4]>(),
        any::<[u8; 20]>(),
        any::<[u8; 32]>(),
        any::<[u8; 10]>(),
        prop::collection::vec(any::<u128>(), 0..6),
        ("[a-z]{0,40}", "[a-z]{0,40}"),
    )
        .prop_map(
            |(count, delta, flag, label, blob, tag, owner, id, zts, amounts, names)| {
                vec![
                    Value::from(count),
                    Value::Int(BigInt::from(delta) * BigInt::from(u64::MAX)),
                    Value::Bool(flag),
                    Value::String(label),
                    Value::Bytes(blob),
                    Value::FixedBytes(tag.to_vec()),
                    Value::Address(Address::from_bytes(&owner).unwrap()),
                    Value::Hash(Hash::from_array(id)),
                    Value::TokenStandard(TokenStandard::from_array(zts)),
                    Value::Slice(amounts.into_iter().map(|a| Value::Int(BigInt::from(a))).collect()),
                    Value::Array(vec![Value::String(names.0), Value::String(names.1)]),
                ]
            },
        )
}

proptest! {
    #[test]
    fn test_method_unpack_inverts_pack(args in arb_args()) {
        let schema = schema();
        let data = schema.pack_method("Everything", &args).unwrap();
        prop_assert_eq!((data.len() - SELECTOR_SIZE) % WORD_SIZE, 0);
        prop_assert_eq!(schema.unpack_method("Everything", &data).unwrap(), args);
    }

    #[test]
    fn test_selector_independent_of_values(a in arb_args(), b in arb_args()) {
        let schema = schema();
        let left = schema.pack_method("Everything", &a).unwrap();
        let right = schema.pack_method("Everything", &b).unwrap();
        prop_assert_eq!(&left[..SELECTOR_SIZE], &right[..SELECTOR_SIZE]);
        prop_assert_eq!(&schema.method_by_id(&left[..SELECTOR_SIZE]).unwrap().name, "Everything");
    }

    #[test]
    fn test_variable_unpack_inverts_pack(
        amount in any::<u128>(),
        owners in prop::collection::vec(any::<[u8; 20]>(), 0..5),
    ) {
        let schema = schema();
        let values = vec![
            Value::Int(BigInt::from(amount)),
            Value::Slice(owners.iter().map(|o| Value::Address(Address::from_bytes(o).unwrap())).collect()),
        ];
        let data = schema.pack_variable("entry", &values).unwrap();
        prop_assert_eq!(data.len() % WORD_SIZE, 0);
        prop_assert_eq!(schema.unpack_variable("entry", &data).unwrap(), values);
    }

    #[test]
    fn test_unpack_never_panics(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let schema = schema();
        let _ = schema.unpack_method("Everything", &data);
        let _ = schema.unpack_variable("entry", &data);
    }

    #[test]
    fn test_type_names_parse_back(depth in 0usize..3, fixed in 1usize..4, dynamic in any::<bool>()) {
        let mut text = String::from("uint256");
        for _ in 0..depth {
            if dynamic {
                text.push_str("[]");
            } else {
                text.push_str(&format!("[{fixed}]"));
            }
        }
        let ty = AbiType::parse(&text).unwrap();
        prop_assert_eq!(ty.to_string(), text);
    }
}

#[test]
fn test_three_byte_input_is_empty() {
    let schema = schema();
    assert_eq!(
        schema.unpack_method("Everything", &[1, 2, 3]),
        Err(momentum_abi::AbiError::EmptyInput)
    );
}
