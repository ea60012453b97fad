use dagsync_types::Hash;

/// Errors from store operations.
///
/// Absence is never an error: lookups return `Option`/`bool`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// `add` was called for a key that is already present.
    #[error("key already present: {0}")]
    AlreadyExists(Hash),

    /// `add` was called with the null key.
    #[error("cannot store entry under the null key")]
    NullKey,

    /// `add` was called with a payload that does not hash to its key.
    #[error("hash mismatch for {key}: payload hashes to {computed}")]
    HashMismatch { key: Hash, computed: Hash },

    /// A value could not be encoded for `save`.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
