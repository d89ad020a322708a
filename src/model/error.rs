//! Error types for vistrack.
//!
//! The tracker itself is purely reactive: once running it consumes host events
//! and has no failure surface of its own. Everything that can fail happens at
//! startup, before the first event is delivered.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error of the replay binary
//!   - [`TrackerError`] - Startup preconditions of the tracker (host facilities, settings)
//!   - [`ConfigError`] - Config file read/parse failures
//!   - [`LoggingError`] - Tracing subscriber setup failures
//!   - [`ReplayError`] - Scenario loading and replay failures
//!
//! # Conditions that are NOT errors
//!
//! - Revoking the watch on an element that was never watched is a no-op.
//! - A visible element without text contributes nothing to the snapshot.

use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::replay::ReplayError;
use std::fmt;
use thiserror::Error;

/// Top-level error returned by the replay binary.
///
/// Domain errors convert via `From`, so `main` composes with `?`.
#[derive(Debug, Error)]
pub enum AppError {
    /// The config file could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The log file could not be set up.
    #[error("Logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    /// Invalid tracker settings.
    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),

    /// The scenario could not be loaded or replayed.
    #[error("Replay failed: {0}")]
    Replay(#[from] ReplayError),

    /// Writing the captured snapshots failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Host observation facilities the tracker depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facility {
    /// Intersection-ratio reporting.
    Intersection,
    /// Structural mutation reporting.
    Mutation,
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Facility::Intersection => f.write_str("intersection observer"),
            Facility::Mutation => f.write_str("mutation observer"),
        }
    }
}

/// Startup failures of [`crate::tracker::start_tracking`].
///
/// None of these can occur once tracking has started.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    /// The host lacks a facility the tracker cannot run without.
    ///
    /// Checked once as a startup precondition. The tracker never probes for
    /// facilities per call.
    #[error("Unsupported host: missing {facility}")]
    UnsupportedHost {
        /// The missing facility.
        facility: Facility,
    },

    /// Visibility threshold outside `(0, 1]`.
    #[error("Visibility threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),

    /// The quiet period is zero.
    #[error("Quiet period must be greater than zero")]
    InvalidQuietPeriod,
}
