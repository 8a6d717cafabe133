//! Simulation clock.
//!
//! Cookie expiry is always judged against a [`Clock`] instead of reading the
//! wall clock directly, so a flow can be replayed with a fixed time and
//! cookies can be expired by moving that time forward.

use std::cell::Cell;
use std::rc::Rc;
use time::{Duration, OffsetDateTime};

/// Source of "now" for a simulated client.
pub trait Clock {
    /// Current UTC time.
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A settable clock for deterministic runs.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// hand another to the host.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Rc<Cell<OffsetDateTime>>,
}

impl FixedClock {
    pub fn new(now: OffsetDateTime) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    pub fn set(&self, now: OffsetDateTime) {
        self.now.set(now);
    }

    /// Moves the clock forward (or backward for a negative duration).
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.now.get()
    }
}
