use std::fmt;

use serde::{Deserialize, Serialize};

/// Length of a [`Hash`] in bytes.
pub const HASH_LEN: usize = 32;

/// Key of a stored entry: the BLAKE3 digest of its payload.
///
/// Encodes as 32 raw bytes, so a reference field has a fixed width inside an
/// encoded object. The all-zero value is reserved to mean "no entry".
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash([u8; HASH_LEN]);

impl Hash {
    pub fn sum(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// The reserved all-zero key.
    pub const fn null() -> Self {
        Self([0u8; HASH_LEN])
    }

    pub fn is_null(&self) -> bool {
        self.0 == [0u8; HASH_LEN]
    }

    /// Whether `data` is the payload this key names.
    pub fn verify(&self, data: &[u8]) -> bool {
        Self::sum(data) == *self
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// First four bytes as hex, for log fields.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.short_hex())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}
