//! Test clock.

use chrono::{DateTime, TimeZone, Utc};
use cluecard_core::clock::Clock;

/// A clock that always returns a fixed point in time.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// The timestamp shared by most tests in the workspace.
    ///
    /// # Panics
    ///
    /// Never in practice; the literal date is valid.
    #[must_use]
    pub fn reference() -> Self {
        Self(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
