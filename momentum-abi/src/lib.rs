//! # Momentum ABI
//!
//! Word-aligned binary encoding for embedded-contract calls and persisted
//! contract variables.
//!
//! Every value occupies whole 32-byte words. A method call is the 4-byte
//! selector (first bytes of the SHA3-256 of `Name(type1,type2,...)`)
//! followed by the tuple encoding of its arguments.
//!
//! ## Example
//!
//! ```rust
//! use momentum_abi::{AbiSchema, Value};
//!
//! let schema = AbiSchema::from_json(
//!     r#"[{"type":"function","name":"Burn","inputs":[]},
//!         {"type":"function","name":"CancelFuse","inputs":[{"name":"id","type":"hash"}]}]"#,
//! )
//! .unwrap();
//!
//! let data = schema
//!     .pack_method("CancelFuse", &[Value::Hash(momentum_primitives::Hash::digest(b"id"))])
//!     .unwrap();
//! assert_eq!(data.len(), 4 + 32);
//! assert!(schema.unpack_method("CancelFuse", &data).is_ok());
//! ```

pub mod codec;
pub mod error;
pub mod method;
pub mod schema;
pub mod types;
pub mod value;

pub use error::{AbiError, AbiResult};
pub use method::{selector_of, AbiMethod, AbiVariable, Argument, Selector, SELECTOR_SIZE};
pub use schema::AbiSchema;
pub use types::{AbiType, WORD_SIZE};
pub use value::Value;
