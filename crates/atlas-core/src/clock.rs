//! # Clock
//!
//! Source of "now" for time-based automatic transitions and for the
//! timestamps written into transition records.

use chrono::Duration;
use parking_lot::Mutex;

use crate::temporal::Timestamp;

/// Injectable time source.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
///
/// Used by tests and by the CLI's `--now` override.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    /// Create a clock pinned at `now`.
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock to `now`.
    pub fn set(&self, now: Timestamp) {
        *self.now.lock() = now;
    }

    /// Move the clock forward by `delta`. Saturates instead of overflowing.
    pub fn advance(&self, delta: Duration) {
        let mut guard = self.now.lock();
        if let Some(next) = guard.checked_add(delta) {
            *guard = next;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}
