//! Configuration file loading with precedence handling.

use super::TrackerConfig;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

/// Env var naming an explicit config file.
pub const ENV_CONFIG: &str = "VISTRACK_CONFIG";
/// Env var overriding the visibility threshold.
pub const ENV_THRESHOLD: &str = "VISTRACK_THRESHOLD";
/// Env var overriding the quiet period in milliseconds.
pub const ENV_QUIET_PERIOD_MS: &str = "VISTRACK_QUIET_PERIOD_MS";

/// Failures loading the TOML config file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Cannot read tracker config {}: {reason}", path.display())]
    ReadError {
        /// File that was selected.
        path: PathBuf,
        /// I/O error text.
        reason: String,
    },

    /// Invalid TOML, a wrongly typed value, or an unknown key.
    #[error("Malformed tracker config {}: {reason}", path.display())]
    ParseError {
        /// File that was selected.
        path: PathBuf,
        /// TOML error text, with line and column.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, defaults are used.
/// Corresponds to `~/.config/vistrack/config.toml`:
///
/// ```toml
/// threshold = 0.75
/// quiet_period_ms = 1000
/// excluded_tags = ["script", "iframe"]
/// log_file_path = "/tmp/vistrack.log"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Minimum intersection ratio, `(0, 1]`.
    #[serde(default)]
    pub threshold: Option<f64>,

    /// Quiet period in milliseconds, non-zero.
    #[serde(default)]
    pub quiet_period_ms: Option<u64>,

    /// Replaces the default exclusion list entirely.
    #[serde(default)]
    pub excluded_tags: Option<Vec<String>>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Settings handed to the tracker.
    pub tracker: TrackerConfig,
    /// Where `logging::init` writes.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// `<state_dir>/vistrack/vistrack.log`, or `vistrack.log` in the current
/// directory when the platform has no state directory.
pub fn default_log_path() -> PathBuf {
    match dirs::state_dir() {
        Some(state_dir) => state_dir.join("vistrack").join("vistrack.log"),
        None => PathBuf::from("vistrack.log"),
    }
}

/// Resolve default config file path (`<config_dir>/vistrack/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vistrack").join("config.toml"))
}

/// Read and parse the TOML file at `path`.
///
/// A missing file is not an error and yields `Ok(None)`.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();
    if !path.exists() {
        debug!(path = %path.display(), "no config file");
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|err| ConfigError::ReadError {
        path: path.clone(),
        reason: err.to_string(),
    })?;
    toml::from_str(&contents)
        .map(Some)
        .map_err(|err| ConfigError::ParseError {
            path,
            reason: err.to_string(),
        })
}

/// Pick the config file to load: `explicit` (CLI `--config`), then
/// `VISTRACK_CONFIG`, then [`default_config_path`].
pub fn config_file_candidate(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit
        .or_else(|| std::env::var_os(ENV_CONFIG).map(PathBuf::from))
        .or_else(default_config_path)
}

/// Load whichever config file [`config_file_candidate`] selects.
///
/// # Errors
///
/// Only when the selected file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    explicit: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    match config_file_candidate(explicit) {
        Some(path) => load_config_file(path),
        None => Ok(None),
    }
}

/// Merge config file into defaults to create resolved config.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        tracker: TrackerConfig {
            threshold: config.threshold.unwrap_or(defaults.tracker.threshold),
            quiet_period_ms: config
                .quiet_period_ms
                .unwrap_or(defaults.tracker.quiet_period_ms),
            excluded_tags: config
                .excluded_tags
                .unwrap_or(defaults.tracker.excluded_tags),
        },
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply `VISTRACK_THRESHOLD` / `VISTRACK_QUIET_PERIOD_MS` from the process
/// environment.
pub fn apply_env_overrides(config: ResolvedConfig) -> ResolvedConfig {
    apply_env_overrides_from(config, |key| std::env::var(key).ok())
}

/// Apply environment overrides read through `lookup`.
///
/// Values that do not parse are ignored with a warning.
pub fn apply_env_overrides_from(
    mut config: ResolvedConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    if let Some(raw) = lookup(ENV_THRESHOLD) {
        match raw.trim().parse::<f64>() {
            Ok(threshold) => config.tracker.threshold = threshold,
            Err(err) => warn!(var = ENV_THRESHOLD, value = %raw, %err, "ignoring override"),
        }
    }

    if let Some(raw) = lookup(ENV_QUIET_PERIOD_MS) {
        match raw.trim().parse::<u64>() {
            Ok(ms) => config.tracker.quiet_period_ms = ms,
            Err(err) => warn!(var = ENV_QUIET_PERIOD_MS, value = %raw, %err, "ignoring override"),
        }
    }

    config
}

/// Apply CLI argument overrides to resolved config.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    threshold_override: Option<f64>,
    quiet_period_override: Option<u64>,
) -> ResolvedConfig {
    if let Some(threshold) = threshold_override {
        config.tracker.threshold = threshold;
    }

    if let Some(ms) = quiet_period_override {
        config.tracker.quiet_period_ms = ms;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
