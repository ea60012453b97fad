//! Schema-driven Merkle-DAG layer for dagsync.
//!
//! Objects are stored in a [`ContentStore`](dagsync_store::ContentStore)
//! next to the [`Schema`] that describes their fields. Reference fields hold
//! hashes of other objects, so a graph of objects forms a DAG whose edges are
//! content hashes. A [`Root`] pins one version of such a graph: the entry
//! object, its schema, and a registry mapping schema names to schema hashes.
//!
//! The [`Container`] holds the current root and answers the question a
//! syncing node keeps asking: which hashes reachable from the root are not
//! stored locally yet? See [`Container::want`].
//!
//! # Modules
//!
//! - [`codec`] — deterministic encoding and single-field extraction
//! - [`schema`] — [`Schema`], [`Field`], [`FieldType`], the [`Object`] trait
//! - [`tag`] — field tag parsing and [`Reference`] descriptors
//! - [`root`] — the versioned [`Root`] snapshot
//! - [`container`] — [`Container`]: current root + store
//! - [`want`] — the want-set resolver

pub mod codec;
pub mod config;
pub mod container;
pub mod error;
pub mod root;
pub mod schema;
pub mod tag;
pub mod want;

pub use config::WantConfig;
pub use container::Container;
pub use error::{ObjectError, ObjectResult};
pub use root::Root;
pub use schema::{DynamicRef, Field, FieldType, Object, Schema};
pub use tag::Reference;
pub use want::WantSet;
