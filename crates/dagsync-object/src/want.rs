//! Want-set resolution.
//!
//! Starting from a root's `(schema, object)` pair, the resolver walks every
//! reference field and collects the hashes that are reachable but not
//! stored. A node asks for the want-set, fetches those hashes from peers,
//! inserts them with [`ContentStore::add`], and asks again until the set is
//! empty.
//!
//! # Partial knowledge
//!
//! An object whose schema is missing cannot be introspected. The resolver
//! then wants the schema (and the object, if it is missing too) and stops
//! there; the object's children are discovered by a later call once the
//! schema has arrived. An object that is missing has unknown children for
//! the same reason.
//!
//! # Failure
//!
//! Any error aborts the whole walk. An error means "cannot tell what is
//! missing right now", never "nothing else is missing".
//!
//! # Cycles
//!
//! Reference graphs are assumed acyclic. With the default [`WantConfig`] the
//! walk is unbounded; set [`WantConfig::max_depth`] to turn a cycle into
//! [`ObjectError::DepthExceeded`].

use std::collections::HashSet;

use tracing::{debug, trace};

use dagsync_store::ContentStore;
use dagsync_types::Hash;

use crate::codec;
use crate::container::Container;
use crate::error::{ObjectError, ObjectResult};
use crate::root::Root;
use crate::schema::DynamicRef;
use crate::tag::Reference;

/// Hashes needed to materialize a root's graph that are not stored locally.
pub type WantSet = HashSet<Hash>;

impl<S: ContentStore> Container<S> {
    /// Compute the want-set of the current root.
    ///
    /// Returns an empty set if there is no root, or if the whole graph is
    /// present.
    pub fn want(&self) -> ObjectResult<WantSet> {
        let Some(root) = self.root() else {
            return Ok(WantSet::new());
        };
        let resolver = Resolver {
            store: self.store().as_ref(),
            root,
            max_depth: self.config().max_depth,
        };
        let want = resolver.want(root.schema, root.object, 0)?;
        debug!(
            root = %root.object.short_hex(),
            missing = want.len(),
            "computed want-set"
        );
        Ok(want)
    }
}

struct Resolver<'a, S: ContentStore> {
    store: &'a S,
    root: &'a Root,
    max_depth: Option<usize>,
}

impl<S: ContentStore> Resolver<'_, S> {
    fn want(&self, schema: Hash, object: Hash, depth: usize) -> ObjectResult<WantSet> {
        if let Some(max) = self.max_depth {
            if depth > max {
                return Err(ObjectError::DepthExceeded(max));
            }
        }

        let mut want = WantSet::new();

        let Some(schema_data) = self.store.get(&schema) else {
            trace!(schema = %schema.short_hex(), object = %object.short_hex(), "schema missing");
            want.insert(schema);
            if !self.store.has(&object) {
                want.insert(object);
            }
            return Ok(want);
        };

        let Some(object_data) = self.store.get(&object) else {
            trace!(object = %object.short_hex(), "object missing");
            want.insert(object);
            return Ok(want);
        };

        let decoded = codec::decode_schema(&schema_data)?;
        for field in &decoded.fields {
            let Some(reference) = field.reference()? else {
                continue;
            };
            match reference {
                Reference::Plain { schema: name } => {
                    let target: Hash = codec::decode_field(&object_data, &decoded.fields, &field.name)?;
                    let target_schema = self.root.schema_of(&name)?;
                    if target.is_null() {
                        continue;
                    }
                    want.extend(self.want(target_schema, target, depth + 1)?);
                }
                Reference::Array { schema: name } => {
                    let targets: Vec<Hash> =
                        codec::decode_field(&object_data, &decoded.fields, &field.name)?;
                    let target_schema = self.root.schema_of(&name)?;
                    for target in targets.into_iter().filter(|t| !t.is_null()) {
                        want.extend(self.want(target_schema, target, depth + 1)?);
                    }
                }
                Reference::Dynamic => {
                    let dynamic: DynamicRef =
                        codec::decode_field(&object_data, &decoded.fields, &field.name)?;
                    if dynamic.is_empty() {
                        continue;
                    }
                    if dynamic.schema.is_null() || dynamic.object.is_null() {
                        return Err(ObjectError::Codec(format!(
                            "incomplete dynamic reference in field {}",
                            field.name
                        )));
                    }
                    want.extend(self.want(dynamic.schema, dynamic.object, depth + 1)?);
                }
            }
        }
        Ok(want)
    }
}
