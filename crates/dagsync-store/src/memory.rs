use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use tracing::trace;

use dagsync_types::Hash;

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::traits::{ContentStore, Statistic};

/// In-memory, HashMap-based content store.
///
/// All entries are held behind a single `RwLock`. Payloads are cloned on
/// read.
pub struct MemoryStore {
    entries: RwLock<HashMap<Hash, Vec<u8>>>,
}

impl MemoryStore {
    /// Create a new empty store with the default configuration.
    pub fn new() -> Self {
        Self::with_config(&StoreConfig::default())
    }

    pub fn with_config(config: &StoreConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity(config.initial_capacity)),
        }
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore for MemoryStore {
    fn update(&self, data: Vec<u8>) -> Hash {
        let key = Hash::sum(&data);
        assert!(!key.is_null(), "refusing to store entry under the null key");
        trace!(key = %key.short_hex(), len = data.len(), "update");
        self.entries
            .write()
            .expect("lock poisoned")
            .insert(key, data);
        key
    }

    fn add(&self, key: Hash, data: Vec<u8>) -> StoreResult<()> {
        if key.is_null() {
            return Err(StoreError::NullKey);
        }
        let mut map = self.entries.write().expect("lock poisoned");
        if map.contains_key(&key) {
            return Err(StoreError::AlreadyExists(key));
        }
        if !key.verify(&data) {
            return Err(StoreError::HashMismatch {
                key,
                computed: Hash::sum(&data),
            });
        }
        trace!(key = %key.short_hex(), len = data.len(), "add");
        map.insert(key, data);
        Ok(())
    }

    fn has(&self, key: &Hash) -> bool {
        self.entries.read().expect("lock poisoned").contains_key(key)
    }

    fn get(&self, key: &Hash) -> Option<Vec<u8>> {
        self.entries.read().expect("lock poisoned").get(key).cloned()
    }

    fn select(&self, predicate: &dyn Fn(&Hash, &[u8]) -> bool) -> Vec<Hash> {
        let map = self.entries.read().expect("lock poisoned");
        map.iter()
            .filter(|(key, data)| predicate(*key, data.as_slice()))
            .map(|(key, _)| *key)
            .collect()
    }

    fn statistic(&self) -> Statistic {
        let map = self.entries.read().expect("lock poisoned");
        Statistic {
            total: map.len(),
            memory: map.values().map(Vec::len).sum(),
        }
    }

    fn snapshot(&self) -> BTreeMap<Hash, Vec<u8>> {
        let map = self.entries.read().expect("lock poisoned");
        map.iter().map(|(k, v)| (*k, v.clone())).collect()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entry_count", &self.len())
            .finish()
    }
}
