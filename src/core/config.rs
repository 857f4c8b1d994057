//! Engine configuration.
//!
//! Hosts configure the engine once when opening a document:
//! - how deep script calls may nest before evaluation is aborted,
//! - how many cascading refresh passes run before giving up on a cycle,
//! - how many undo steps are kept,
//! - the seed for the random builtins.

use serde::{Deserialize, Serialize};

/// Default maximum call depth.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 128;

/// Default maximum number of cascading refresh passes.
pub const DEFAULT_MAX_UPDATE_PASSES: usize = 16;

/// Complete engine configuration.
///
/// ## Example
///
/// ```
/// use rust_cardsmith::core::EngineConfig;
///
/// let config = EngineConfig::new()
///     .with_max_call_depth(64)
///     .with_undo_limit(100)
///     .with_seed(7);
///
/// assert_eq!(config.max_call_depth, 64);
/// assert_eq!(config.undo_limit, Some(100));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Nested function calls allowed before `ScriptError::Recursion`.
    pub max_call_depth: usize,

    /// Refresh passes allowed per update.
    ///
    /// Dependency cycles are not rejected; they simply stop propagating
    /// once this many passes have run.
    pub max_update_passes: usize,

    /// Maximum undo steps kept. `None` for unlimited.
    pub undo_limit: Option<usize>,

    /// Seed for `random int`, `random shuffle` and `random select`.
    pub rng_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_update_passes: DEFAULT_MAX_UPDATE_PASSES,
            undo_limit: None,
            rng_seed: 0,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum call depth.
    #[must_use]
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        assert!(depth > 0, "Call depth limit must be positive");
        self.max_call_depth = depth;
        self
    }

    /// Set the maximum number of refresh passes.
    #[must_use]
    pub fn with_max_update_passes(mut self, passes: usize) -> Self {
        assert!(passes > 0, "At least one refresh pass is required");
        self.max_update_passes = passes;
        self
    }

    /// Limit the number of undo steps kept.
    #[must_use]
    pub fn with_undo_limit(mut self, limit: usize) -> Self {
        self.undo_limit = Some(limit);
        self
    }

    /// Set the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
        assert_eq!(config.max_update_passes, DEFAULT_MAX_UPDATE_PASSES);
        assert_eq!(config.undo_limit, None);
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_max_update_passes(3)
            .with_seed(99);
        assert_eq!(config.max_update_passes, 3);
        assert_eq!(config.rng_seed, 99);
    }

    #[test]
    #[should_panic(expected = "must be positive")]
    fn test_zero_depth_panics() {
        let _ = EngineConfig::new().with_max_call_depth(0);
    }

    #[test]
    fn test_config_serialization() {
        let config = EngineConfig::new().with_undo_limit(10);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
