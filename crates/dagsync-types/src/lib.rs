//! Foundation types for dagsync.
//!
//! Every other dagsync crate depends on `dagsync-types`. The only structural
//! type here is [`Hash`]: the 32-byte BLAKE3 digest that names every stored
//! entry and doubles as its integrity proof.

pub mod hash;

pub use hash::Hash;
