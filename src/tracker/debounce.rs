//! Trailing-edge debounce of interaction events.
//!
//! Modeled as an explicit state machine so time is whatever the caller says it
//! is: `schedule` on every qualifying event, `poll` whenever the clock moves.

use crate::model::{Millis, TrackerError};
use std::time::Duration;

/// Default quiet period before a capture fires.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(1000);

/// Where the debouncer is between events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    /// Nothing scheduled.
    Idle,
    /// A capture fires once the clock reaches `deadline`.
    Pending {
        /// Last event time plus the quiet period.
        deadline: Millis,
    },
}

/// Collapses bursts of events into one trailing signal per quiet period.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet_period: Duration,
    state: DebounceState,
}

impl Debouncer {
    /// A debouncer in [`DebounceState::Idle`]. Rejects a zero quiet period.
    pub fn new(quiet_period: Duration) -> Result<Self, TrackerError> {
        if quiet_period.is_zero() {
            return Err(TrackerError::InvalidQuietPeriod);
        }
        Ok(Self {
            quiet_period,
            state: DebounceState::Idle,
        })
    }

    /// Configured quiet period.
    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Current state.
    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// The pending deadline, for hosts that arm a real timer.
    pub fn next_deadline(&self) -> Option<Millis> {
        match self.state {
            DebounceState::Idle => None,
            DebounceState::Pending { deadline } => Some(deadline),
        }
    }

    /// Restart the quiet period at `now`, replacing any pending deadline.
    pub fn schedule(&mut self, now: Millis) {
        self.state = DebounceState::Pending {
            deadline: now.after(self.quiet_period),
        };
    }

    /// Returns `true` exactly once per pending deadline, at or after it.
    pub fn poll(&mut self, now: Millis) -> bool {
        match self.state {
            DebounceState::Pending { deadline } if now >= deadline => {
                self.state = DebounceState::Idle;
                true
            }
            _ => false,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self {
            quiet_period: DEFAULT_QUIET_PERIOD,
            state: DebounceState::Idle,
        }
    }
}
