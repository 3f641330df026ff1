use crate::ProviderError;
use std::{collections::BTreeMap, path::Path};

/// Byte-keyed read access to the recent tier.
///
/// `Ok(None)` means the key is absent; at the chain tip that is the
/// expected end-of-stream condition, not an error.
pub trait KeyValueStore {
    /// Fetches the value stored under `key`.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ProviderError>;
}

/// Read-only RocksDB handle over the chain-data directory. The on-disk
/// format is of the LevelDB lineage, which RocksDB opens directly.
pub struct RocksKv {
    db: rocksdb::DB,
}

impl RocksKv {
    /// Opens the database at `path` read-only.
    pub fn open(path: &Path) -> Result<Self, ProviderError> {
        let opts = rocksdb::Options::default();
        let db = rocksdb::DB::open_for_read_only(&opts, path, false)
            .map_err(|err| ProviderError::Database(err.into_string()))?;
        Ok(Self { db })
    }
}

impl KeyValueStore for RocksKv {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ProviderError> {
        self.db.get(key).map_err(|err| ProviderError::Database(err.into_string()))
    }
}

impl std::fmt::Debug for RocksKv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksKv").finish_non_exhaustive()
    }
}

/// Ordered in-memory store, for tests and tooling.
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryKv {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`.
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ProviderError> {
        Ok(self.entries.get(key).cloned())
    }
}
