//! Typed access to engine state stored in a flat key space.
//!
//! Readers take any [`ReadStore`](momentum_storage::ReadStore); writers take
//! any [`WriteStore`](momentum_storage::WriteStore), which during execution
//! is always an [`Overlay`](momentum_storage::Overlay) so nothing reaches the
//! base store until the caller applies the returned changes.

pub mod account;
pub mod keys;
pub mod ledger;

pub use account::HeightRecord;
