//! Monotonic clock abstraction for deadline bookkeeping.
//!
//! Expiration policies read time through a [`Clock`] trait object instead of
//! calling `Instant::now()` directly, so tests can substitute a
//! [`ManualClock`] and assert expiration behaviour without sleeping.
//!
//! The default source is [`MonotonicClock`], a zero-sized wrapper over the
//! platform monotonic clock.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Source of monotonic time.
///
/// Implementations must be monotonic: successive `now()` calls never go
/// backwards.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Default clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Test clock that only moves when told to.
///
/// Starts at the construction instant and advances via [`advance`](Self::advance).
/// Share it between a test and an expiration policy with `Arc`:
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use cachecore::clock::{Clock, ManualClock};
///
/// let clock = Arc::new(ManualClock::new());
/// let before = clock.now();
/// clock.advance(Duration::from_secs(5));
/// assert_eq!(clock.now() - before, Duration::from_secs(5));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}
