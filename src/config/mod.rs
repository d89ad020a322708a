//! Configuration module.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, apply_env_overrides_from, config_file_candidate,
    default_config_path, default_log_path, load_config_file, load_config_with_precedence,
    merge_config, ConfigError, ConfigFile, ResolvedConfig,
};

use crate::model::TrackerError;
use crate::tracker::{Debouncer, Threshold, DEFAULT_EXCLUDED_TAGS, DEFAULT_QUIET_PERIOD};
use std::time::Duration;

/// Settings consumed by [`crate::tracker::start_tracking`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Minimum intersection ratio for an element to count as visible.
    pub threshold: f64,

    /// Interaction-free time before a capture fires, in milliseconds.
    pub quiet_period_ms: u64,

    /// Tags never tracked. Matched case-insensitively.
    pub excluded_tags: Vec<String>,
}

impl TrackerConfig {
    /// `quiet_period_ms` as a `Duration`.
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }

    /// Check the ranges `start_tracking` enforces, without starting anything.
    pub fn validate(&self) -> Result<(), TrackerError> {
        Threshold::new(self.threshold)?;
        Debouncer::new(self.quiet_period())?;
        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            threshold: Threshold::DEFAULT.get(),
            quiet_period_ms: DEFAULT_QUIET_PERIOD.as_millis() as u64,
            excluded_tags: DEFAULT_EXCLUDED_TAGS.iter().map(|tag| tag.to_string()).collect(),
        }
    }
}
