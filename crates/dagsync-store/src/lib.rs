//! Content-addressed byte store for dagsync.
//!
//! A flat `Hash -> bytes` table. Every entry is stored under the BLAKE3 hash
//! of its payload, so the key is also the integrity proof for the value.
//!
//! # Design Rules
//!
//! 1. For every stored entry, `key == Hash::sum(payload)`.
//! 2. Entries are never deleted; there is no garbage collection.
//! 3. Locally computed writes (`save`, `update`) may overwrite: two writers
//!    producing the same key necessarily agree on the payload.
//! 4. Externally sourced writes (`add`) are checked and never overwrite.
//! 5. The store never interprets payloads.
//!
//! All backends implement the [`ContentStore`] trait; [`MemoryStore`] is the
//! `HashMap`-based implementation guarded by a single `RwLock`.

pub mod config;
pub mod error;
pub mod memory;
pub mod traits;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use traits::{ContentStore, Statistic};
