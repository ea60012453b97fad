use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use dagsync_store::{ContentStore, MemoryStore};
use dagsync_types::Hash;

use crate::codec;
use crate::config::WantConfig;
use crate::error::{ObjectError, ObjectResult};
use crate::root::Root;
use crate::schema::Object;
use crate::tag;

/// The current [`Root`] plus the store its graph lives in.
///
/// A container has a single logical owner: replacing the root takes
/// `&mut self`, and nothing inside is synchronized. Share it across threads
/// only behind external mutual exclusion. The store itself is shared and
/// thread-safe.
pub struct Container<S: ContentStore = MemoryStore> {
    store: Arc<S>,
    root: Option<Root>,
    config: WantConfig,
}

impl<S: ContentStore> Container<S> {
    /// Create a container with no root over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, WantConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: WantConfig) -> Self {
        Self {
            store,
            root: None,
            config,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &WantConfig {
        &self.config
    }

    /// The current root, if any.
    pub fn root(&self) -> Option<&Root> {
        self.root.as_ref()
    }

    // ---------------------------------------------------------------
    // Root replacement
    // ---------------------------------------------------------------

    /// Replace the current root with `candidate` if there is none yet or
    /// `candidate` is strictly newer. Returns whether it was replaced.
    pub fn set_root(&mut self, candidate: Root) -> bool {
        let replace = match &self.root {
            None => true,
            Some(held) => candidate.is_newer_than(held),
        };
        debug!(
            object = %candidate.object.short_hex(),
            timestamp = candidate.timestamp,
            replace,
            "set root"
        );
        if replace {
            self.root = Some(candidate);
        }
        replace
    }

    /// Decode a root received from a peer and offer it to [`set_root`].
    ///
    /// [`set_root`]: Container::set_root
    pub fn set_encoded_root(&mut self, data: &[u8]) -> ObjectResult<bool> {
        let root = Root::decode(data)?;
        Ok(self.set_root(root))
    }

    // ---------------------------------------------------------------
    // Saving and loading
    // ---------------------------------------------------------------

    /// Encode and store a value, returning its hash.
    pub fn save<T: Serialize + ?Sized>(&self, value: &T) -> ObjectResult<Hash> {
        Ok(self.store.save(value)?)
    }

    /// Save each value in order and return their hashes.
    pub fn save_array<T: Serialize>(&self, values: &[T]) -> ObjectResult<Vec<Hash>> {
        values.iter().map(|v| self.save(v)).collect()
    }

    /// Store `T`'s schema and return its hash.
    pub fn save_schema<T: Object>(&self) -> ObjectResult<Hash> {
        let data = T::schema().encode()?;
        Ok(self.store.update(data))
    }

    /// Store `T`'s schema and register it in `root` under the schema's name.
    pub fn register<T: Object>(&self, root: &mut Root) -> ObjectResult<Hash> {
        let hash = self.save_schema::<T>()?;
        root.register(T::schema().name, hash);
        Ok(hash)
    }

    /// Save `value` and its schema and build a root pointing at them, with
    /// the value's schema already registered.
    ///
    /// The root is not installed; pass it to [`set_root`](Container::set_root).
    pub fn new_root<T: Object>(&self, value: &T) -> ObjectResult<Root> {
        let schema = self.save_schema::<T>()?;
        let object = self.save(value)?;
        let mut root = Root::new(schema, object);
        root.register(T::schema().name, schema);
        Ok(root)
    }

    /// Load and decode a stored value.
    pub fn get<T: DeserializeOwned>(&self, hash: &Hash) -> ObjectResult<T> {
        let data = self
            .store
            .get(hash)
            .ok_or(ObjectError::MissingObject(*hash))?;
        codec::decode(&data)
    }

    // ---------------------------------------------------------------
    // Registry
    // ---------------------------------------------------------------

    /// Resolve a field tag's `schema=<name>` through the current root's
    /// registry.
    pub fn schema_by_tag(&self, tag: &str) -> ObjectResult<Hash> {
        let name = tag::tag_schema_name(tag)?;
        let root = self.root.as_ref().ok_or(ObjectError::MissingRoot)?;
        root.schema_of(name)
    }
}

impl<S: ContentStore> std::fmt::Debug for Container<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("root", &self.root)
            .field("config", &self.config)
            .finish()
    }
}
