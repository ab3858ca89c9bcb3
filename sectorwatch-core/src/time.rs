//! Clock abstraction for cycle timing
//!
//! The pipeline never reads the wall clock directly: every stage that needs
//! "now" receives it as a parameter, and the [`Monitor`](crate::monitor)
//! samples it once per cycle from a [`Clock`]. This keeps block-window
//! arithmetic, auto-expiry, and state transitions fully deterministic under
//! test.
//!
//! Advisory time ranges are announced as local `HHMM` pairs; the parser
//! anchors them to the calendar date of the supplied `now`. The core is
//! timezone-agnostic: it only requires that the clock and the advisory feed
//! agree on what local time is, and carries instants as `DateTime<Utc>`.

use chrono::{DateTime, Utc};

/// Instant in time as used throughout the pipeline
pub type Timestamp = DateTime<Utc>;

/// Source of the current time
pub trait Clock {
    /// Get the current instant
    fn now(&self) -> Timestamp;
}

/// Wall-clock time from the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Fixed time source for testing
///
/// Set or advance the instant explicitly to drive expiry and extension
/// scenarios without sleeping.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Timestamp,
}

impl FixedClock {
    /// Create a clock frozen at `now`
    pub fn new(now: Timestamp) -> Self {
        Self { now }
    }

    /// Jump to an absolute instant
    pub fn set(&mut self, now: Timestamp) {
        self.now = now;
    }

    /// Move the clock forward
    pub fn advance(&mut self, delta: chrono::Duration) {
        self.now += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.now
    }
}
