use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dagsync_types::Hash;

use crate::error::{StoreError, StoreResult};

/// Entry count and payload volume of a store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistic {
    /// Number of stored entries.
    pub total: usize,
    /// Sum of payload lengths in bytes. Keys are not counted.
    pub memory: usize,
}

/// Content-addressed byte store.
///
/// All implementations must satisfy these invariants:
/// - Every entry is keyed by the hash of its payload.
/// - Reads may run concurrently with each other; a write excludes all
///   other readers and writers.
/// - Entries are never removed.
pub trait ContentStore: Send + Sync {
    /// Store `data` under `Hash::sum(data)` and return the key.
    ///
    /// Overwrites unconditionally if the key is already present, which is
    /// harmless since the payload is identical.
    ///
    /// # Panics
    ///
    /// Panics if the computed key is null. That can only come from a broken
    /// caller, never from valid data.
    fn update(&self, data: Vec<u8>) -> Hash;

    /// Insert an externally sourced entry under `key`.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if the key is present, in
    /// which case the stored payload is left untouched. A null key or a
    /// payload that does not hash to `key` is rejected.
    fn add(&self, key: Hash, data: Vec<u8>) -> StoreResult<()>;

    /// Check whether an entry exists.
    fn has(&self, key: &Hash) -> bool;

    /// Read an entry's payload.
    fn get(&self, key: &Hash) -> Option<Vec<u8>>;

    /// Keys of all entries matching `predicate`, in unspecified order.
    ///
    /// This is a full linear scan holding the read lock for its duration.
    fn select(&self, predicate: &dyn Fn(&Hash, &[u8]) -> bool) -> Vec<Hash>;

    /// Entry count and total payload size.
    fn statistic(&self) -> Statistic;

    /// Sorted copy of every entry. For diagnostics only.
    fn snapshot(&self) -> BTreeMap<Hash, Vec<u8>>;

    /// Encode `value` deterministically and store it, returning its key.
    ///
    /// Saving identical content twice leaves the store unchanged.
    fn save<T: Serialize + ?Sized>(&self, value: &T) -> StoreResult<Hash>
    where
        Self: Sized,
    {
        let data =
            bincode::serialize(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(self.update(data))
    }
}
