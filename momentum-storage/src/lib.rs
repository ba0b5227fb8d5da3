//! # Momentum Storage
//!
//! Key-value storage abstractions consumed by the execution engine.
//!
//! The engine only ever reads from a [`ReadStore`]. All mutations are staged
//! in an [`Overlay`], whose [`Changes`] are handed back to the caller and
//! applied to a [`WriteStore`] once accepted.
//!
//! ## Example
//!
//! ```rust
//! use momentum_storage::{MemoryStore, Overlay, ReadStore, WriteStore};
//!
//! let mut store = MemoryStore::new();
//! let changes = {
//!     let mut overlay = Overlay::new(&store);
//!     overlay.put(b"key".to_vec(), b"value".to_vec()).unwrap();
//!     overlay.into_changes()
//! };
//! store.apply(&changes).unwrap();
//! assert_eq!(store.get(b"key").unwrap(), Some(b"value".to_vec()));
//! ```

pub mod changes;
pub mod error;
pub mod memory;
pub mod overlay;
pub mod traits;

pub use changes::Changes;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use overlay::Overlay;
pub use traits::{ReadStore, ReadStoreExt, WriteStore, WriteStoreExt};
