//! Individual time-to-live per entry.
//!
//! Each insert can carry its own TTL; entries without one fall back to an
//! optional default, and with no default configured they live forever.
//! Suits caches mixing data of different volatility, HTTP-style
//! `Cache-Control` handling, and absolute "expire at" schedules.

use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use crate::clock::{Clock, MonotonicClock};
use crate::expiry::ExpirationPolicy;

/// Expiration policy with a per-key TTL and an optional default.
///
/// TTL precedence on insert: the per-insert custom TTL, else the configured
/// default, else infinite (no deadline recorded). A zero TTL is treated as
/// invalid and records nothing.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use cachecore::expiry::{ExpirationPolicy, PerKeyTtl};
///
/// let mut policy = PerKeyTtl::new(None);
/// policy.on_insert("volatile", Some(Duration::from_millis(100)));
/// policy.on_insert("pinned", None);
///
/// assert!(policy.has_deadline(&"volatile"));
/// assert!(!policy.has_deadline(&"pinned")); // infinite
/// ```
pub struct PerKeyTtl<K> {
    default_ttl: Option<Duration>,
    deadlines: FxHashMap<K, Instant>,
    clock: Arc<dyn Clock>,
}

impl<K> PerKeyTtl<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates a policy on the platform monotonic clock.
    ///
    /// `default_ttl = None` means keys inserted without a custom TTL live
    /// forever.
    pub fn new(default_ttl: Option<Duration>) -> Self {
        Self::with_clock(default_ttl, Arc::new(MonotonicClock))
    }

    /// Creates a policy reading time from `clock`.
    pub fn with_clock(default_ttl: Option<Duration>, clock: Arc<dyn Clock>) -> Self {
        Self {
            default_ttl,
            deadlines: FxHashMap::default(),
            clock,
        }
    }

    /// Pins an absolute deadline for a key, tracked or not.
    ///
    /// Useful for "drop at the end of the trading day" schedules where the
    /// expiry point is a clock instant rather than a duration from now.
    pub fn set_expire_at(&mut self, key: K, deadline: Instant) {
        self.deadlines.insert(key, deadline);
    }

    /// Restarts the lifetime of an already-tracked key from now.
    ///
    /// Returns `false` when the key has no deadline record; untracked keys
    /// are left untracked.
    pub fn update_ttl(&mut self, key: &K, ttl: Duration) -> bool {
        match self.deadlines.get_mut(key) {
            Some(deadline) => {
                *deadline = self.clock.now() + ttl;
                true
            }
            None => false,
        }
    }

    /// Makes a key live forever. Returns `true` if a deadline was removed.
    pub fn remove_ttl(&mut self, key: &K) -> bool {
        self.deadlines.remove(key).is_some()
    }

    /// Returns the default TTL.
    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    /// Replaces the default TTL. Affects only subsequent inserts.
    pub fn set_default_ttl(&mut self, ttl: Option<Duration>) {
        self.default_ttl = ttl;
    }

    /// Returns the number of keys with a finite deadline.
    pub fn tracked_len(&self) -> usize {
        self.deadlines.len()
    }

    /// Returns `true` if a key has a finite deadline.
    pub fn has_deadline(&self, key: &K) -> bool {
        self.deadlines.contains_key(key)
    }
}

impl<K> ExpirationPolicy<K> for PerKeyTtl<K>
where
    K: Eq + Hash + Clone + Send + Sync,
{
    fn is_expired(&self, key: &K) -> bool {
        match self.deadlines.get(key) {
            Some(&deadline) => self.clock.now() > deadline,
            None => false,
        }
    }

    fn on_insert(&mut self, key: K, custom_ttl: Option<Duration>) {
        let ttl = custom_ttl.or(self.default_ttl);

        let ttl = match ttl {
            Some(ttl) => ttl,
            None => {
                // Infinite lifetime: drop any deadline left from a previous
                // binding of this key.
                self.deadlines.remove(&key);
                return;
            }
        };

        if ttl.is_zero() {
            // Invalid TTL: record nothing.
            return;
        }

        let deadline = self.clock.now() + ttl;
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
