//! Unified read-only access to a node's block history.
//!
//! A [`Store`] opens both storage tiers of a chain-data directory: the
//! ordered key-value store holding recent blocks and the freezer holding
//! cold history. Its [`BlockIterator`] walks fully decoded blocks in
//! ascending order from any height, switching from the freezer to the
//! key-value tier at the ancient frontier.

mod error;
mod keys;
mod kv;
mod recent;
mod store;

pub use error::ProviderError;
pub use kv::{KeyValueStore, MemoryKv, RocksKv};
pub use store::{BlockIterator, Store};
