use serde::{Deserialize, Serialize};

/// Configuration for want-set resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WantConfig {
    /// Maximum reference nesting below the root object.
    ///
    /// `None` walks without a bound. Reference graphs must then be acyclic:
    /// a cycle recurses until the stack is exhausted.
    pub max_depth: Option<usize>,
}

impl WantConfig {
    /// A configuration that aborts past `max_depth` levels of nesting.
    pub fn bounded(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
        }
    }
}
