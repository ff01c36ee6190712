// SPDX-License-Identifier: MIT

//! Time abstraction so bus timestamps and duration math are testable
//! without sleeping real wall-clock time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Abstraction over wall-clock time.
pub trait Clock: Send + Sync + 'static {
    /// Current time.
    fn now(&self) -> SystemTime;
}

/// Real wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Fixed-and-advanceable clock for deterministic tests.
#[derive(Debug)]
pub struct FakeClock {
    micros_since_epoch: AtomicU64,
}

impl FakeClock {
    /// Start the clock at the Unix epoch.
    pub fn new() -> Self {
        Self {
            micros_since_epoch: AtomicU64::new(0),
        }
    }

    /// Advance the clock by `d`.
    pub fn advance(&self, d: Duration) {
        self.micros_since_epoch
            .fetch_add(d.as_micros() as u64, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_micros(self.micros_since_epoch.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
