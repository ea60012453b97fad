use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use bincode::Options;
use serde::{Deserialize, Serialize};

use dagsync_types::Hash;

use crate::codec;
use crate::error::{ObjectError, ObjectResult};

/// One versioned snapshot of an object graph.
///
/// Points at the entry object and its schema, and carries the registry that
/// maps schema names (as used in field tags) to schema hashes. Roots are
/// ordered only by `timestamp`; there is no history or merge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Root {
    /// Hash of the entry object's schema.
    pub schema: Hash,
    /// Hash of the entry object.
    pub object: Hash,
    /// Schema name -> schema hash.
    pub registry: BTreeMap<String, Hash>,
    /// Nanoseconds since the UNIX epoch.
    pub timestamp: i64,
}

fn now_nanos() -> i64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    i64::try_from(nanos).unwrap_or(i64::MAX)
}

impl Root {
    /// Create a root stamped with the current wall-clock time.
    pub fn new(schema: Hash, object: Hash) -> Self {
        Self::with_timestamp(schema, object, now_nanos())
    }

    pub fn with_timestamp(schema: Hash, object: Hash, timestamp: i64) -> Self {
        Self {
            schema,
            object,
            registry: BTreeMap::new(),
            timestamp,
        }
    }

    /// Advance the timestamp to now, or by one if the clock has not moved
    /// past it.
    pub fn touch(&mut self) {
        self.timestamp = now_nanos().max(self.timestamp.saturating_add(1));
    }

    /// Register a schema hash under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, schema: Hash) {
        self.registry.insert(name.into(), schema);
    }

    /// Look up a registered schema hash.
    pub fn schema_of(&self, name: &str) -> ObjectResult<Hash> {
        self.registry
            .get(name)
            .copied()
            .ok_or_else(|| ObjectError::UnregisteredSchema(name.to_string()))
    }

    /// Returns `true` if this root should replace `other`.
    pub fn is_newer_than(&self, other: &Root) -> bool {
        self.timestamp > other.timestamp
    }

    pub fn encode(&self) -> ObjectResult<Vec<u8>> {
        codec::encode(self)
    }

    /// Decode a root received from a peer.
    ///
    /// Malformed input, trailing bytes, or null schema/object hashes are
    /// reported as [`ObjectError::Decode`].
    pub fn decode(data: &[u8]) -> ObjectResult<Self> {
        let root: Root = bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .deserialize(data)
            .map_err(|e| ObjectError::Decode(e.to_string()))?;
        if root.schema.is_null() {
            return Err(ObjectError::Decode("null schema hash".into()));
        }
        if root.object.is_null() {
            return Err(ObjectError::Decode("null object hash".into()));
        }
        Ok(root)
    }
}
