//! Table construction options.

use serde::Deserialize;

use crate::captures::MAX_PARAMS;

/// Options applied while building a table.
///
/// Deserializable so hosts can carry it in their own configuration files;
/// missing fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Maximum wildcards per pattern (default: 8). Values above
    /// [`MAX_PARAMS`] are clamped to it.
    pub max_params: usize,

    /// Accept `:` segments with no name (default: true). When disabled they
    /// fail with `InvalidSegment`.
    pub allow_unnamed_wildcards: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_params: MAX_PARAMS,
            allow_unnamed_wildcards: true,
        }
    }
}

impl BuildOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the wildcard ceiling.
    pub fn with_max_params(mut self, max: usize) -> Self {
        self.max_params = max;
        self
    }

    /// Accept or reject unnamed wildcards.
    pub fn with_unnamed_wildcards(mut self, allow: bool) -> Self {
        self.allow_unnamed_wildcards = allow;
        self
    }

    /// The effective wildcard ceiling.
    pub fn param_ceiling(&self) -> usize {
        self.max_params.min(MAX_PARAMS)
    }
}
