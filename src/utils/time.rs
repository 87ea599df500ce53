//! Time source abstraction
//!
//! Cache staleness and token expiry are both decided against a [`Clock`] so that
//! TTL boundaries can be driven deterministically in tests.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::Arc;

/// Source of the current wall-clock time
pub trait Clock: Send + Sync + Debug {
    /// Current time in UTC
    fn now(&self) -> DateTime<Utc>;

    /// Current time as a unix timestamp in seconds
    fn unix_now(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Shared clock handle
pub type SharedClock = Arc<dyn Clock>;

/// The system clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Returns the process-wide system clock as a shared handle
pub fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}

/// Manually driven clock
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Create a clock frozen at the current system time
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    /// Jump to an absolute instant
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
