//! Host clock timestamps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Milliseconds on the host clock.
///
/// Callers pass timestamps in explicitly, so the tracker never reads a clock
/// itself and tests can drive time deterministically.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Millis(u64);

impl Millis {
    /// The clock origin.
    pub const ZERO: Self = Self(0);

    /// `ms` milliseconds after the origin.
    pub const fn new(ms: u64) -> Self {
        Self(ms)
    }

    /// Milliseconds since the origin.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Timestamp `delay` after `self`, saturating at `u64::MAX`.
    pub fn after(self, delay: Duration) -> Self {
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(delay_ms))
    }
}

impl From<u64> for Millis {
    fn from(ms: u64) -> Self {
        Self(ms)
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn after_adds_duration() {
        assert_eq!(
            Millis::new(400).after(Duration::from_millis(1000)),
            Millis::new(1400)
        );
    }

    #[test]
    fn after_saturates() {
        assert_eq!(
            Millis::new(u64::MAX - 1).after(Duration::from_secs(10)),
            Millis::new(u64::MAX)
        );
    }

    #[test]
    fn ordering_follows_value() {
        assert!(Millis::new(1) < Millis::new(2));
        assert_eq!(Millis::default(), Millis::ZERO);
    }
}
