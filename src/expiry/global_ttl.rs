//! Fixed time-to-live shared by every entry.
//!
//! On insert the policy stamps `deadline = now + ttl`; the deadline is never
//! refreshed by access. The stored value is the deadline itself rather than
//! the insert time, so the expiry check is a single comparison against
//! `now()`.

use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use crate::clock::{Clock, MonotonicClock};
use crate::error::ConfigError;
use crate::expiry::ExpirationPolicy;

/// Expiration policy with one shared TTL for all keys.
///
/// Typical fits: quote caches (seconds), session caches (minutes), DNS-style
/// caches. The per-insert custom TTL is ignored; use
/// [`PerKeyTtl`](crate::expiry::PerKeyTtl) for individual lifetimes.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use cachecore::expiry::{ExpirationPolicy, GlobalTtl};
///
/// let mut policy = GlobalTtl::new(Duration::from_secs(30)).unwrap();
/// policy.on_insert("session", None);
/// assert!(!policy.is_expired(&"session"));
/// assert!(policy.time_to_live(&"session").unwrap() <= Duration::from_secs(30));
/// ```
pub struct GlobalTtl<K> {
    ttl: Duration,
    deadlines: FxHashMap<K, Instant>,
    clock: Arc<dyn Clock>,
}

impl<K> GlobalTtl<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates a policy with the given TTL on the platform monotonic clock.
    ///
    /// Fails with [`ConfigError`] when `ttl` is zero.
    pub fn new(ttl: Duration) -> Result<Self, ConfigError> {
        Self::with_clock(ttl, Arc::new(MonotonicClock))
    }

    /// Creates a policy reading time from `clock`.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        if ttl.is_zero() {
            return Err(ConfigError::new("global TTL must be positive"));
        }
        Ok(Self {
            ttl,
            deadlines: FxHashMap::default(),
            clock,
        })
    }

    /// Returns the shared TTL.
    pub fn global_ttl(&self) -> Duration {
        self.ttl
    }

    /// Replaces the shared TTL. Applies only to keys inserted afterwards;
    /// deadlines already recorded are unchanged.
    ///
    /// Fails with [`ConfigError`] when `ttl` is zero.
    pub fn set_global_ttl(&mut self, ttl: Duration) -> Result<(), ConfigError> {
        if ttl.is_zero() {
            return Err(ConfigError::new("global TTL must be positive"));
        }
        self.ttl = ttl;
        Ok(())
    }

    /// Returns the number of keys with a recorded deadline. For a cache
    /// using this policy it matches the cache size.
    pub fn tracked_len(&self) -> usize {
        self.deadlines.len()
    }
}

impl<K> ExpirationPolicy<K> for GlobalTtl<K>
where
    K: Eq + Hash + Clone + Send + Sync,
{
    fn is_expired(&self, key: &K) -> bool {
        match self.deadlines.get(key) {
            Some(&deadline) => self.clock.now() > deadline,
            // Untracked, e.g. the policy was swapped in after the insert.
            None => false,
        }
    }

    fn on_insert(&mut self, key: K, _custom_ttl: Option<Duration>) {
        let deadline = self.clock.now() + self.ttl;
        self.deadlines.insert(key, deadline);
    }

    fn on_access(&mut self, _key: &K) {
        // Fixed TTL: access does not reset the deadline.
    }

    fn on_remove(&mut self, key: &K) {
        self.deadlines.remove(key);
    }

    fn clear(&mut self) {
        self.deadlines.clear();
    }

    fn collect_expired(&self) -> Vec<K> {
        let now = self.clock.now();
        self.deadlines
            .iter()
            .filter(|(_, &deadline)| now > deadline)
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn time_to_live(&self, key: &K) -> Option<Duration> {
        let deadline = *self.deadlines.get(key)?;
        Some(deadline.saturating_duration_since(self.clock.now()))
    }
}
