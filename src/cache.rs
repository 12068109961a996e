//! Cache core: storage plus policy/listener mediation.
//!
//! `Cache` owns the entries and drives the eviction policy, the expiration
//! policy and the listener registry in a fixed order on every operation.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────┐
//!   │                         Cache<K, V>                           │
//!   │                                                               │
//!   │   entries:    FxHashMap<K, V>            (owns the values)    │
//!   │   eviction:   Box<dyn EvictionPolicy<K>> (recency/frequency)  │
//!   │   expiration: Box<dyn ExpirationPolicy<K>> (deadlines)        │
//!   │   listeners:  Vec<Arc<dyn CacheListener<K, V>>>               │
//!   └───────────────────────────────────────────────────────────────┘
//!
//!   get(k):  lookup ─► expiry check ─► policy notify ─► hit event
//!   put(k):  update path: store, access, TTL refresh, update event
//!            insert path: evict if full, store, register, insert event
//! ```
//!
//! ## Ordering rules
//!
//! Removal (explicit, eviction or expiration) always notifies both policies
//! before the corresponding event is emitted, and the event carries the
//! observed key/value. An update never evicts and never changes the size.
//! Expiration is lazy: expired entries are dropped when a `get` trips over
//! them or when [`remove_expired`](Cache::remove_expired) sweeps them.
//!
//! The core is single-threaded; wrap it in
//! [`ConcurrentCache`](crate::concurrent::ConcurrentCache) or
//! [`ShardedCache`](crate::concurrent::ShardedCache) for parallel use.

use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use rustc_hash::FxHashMap;

use crate::error::ConfigError;
use crate::expiry::{ExpirationPolicy, NoExpiration};
use crate::listener::CacheListener;
use crate::policy::EvictionPolicy;

/// Bounded key–value cache with pluggable eviction and expiration.
///
/// # Example
///
/// ```
/// use cachecore::cache::Cache;
/// use cachecore::policy::LruPolicy;
///
/// let mut cache = Cache::new(2, Box::new(LruPolicy::new())).unwrap();
/// cache.put("a", 1);
/// cache.put("b", 2);
/// cache.get(&"a");
/// cache.put("c", 3); // evicts "b", the least recently used
///
/// assert_eq!(cache.get(&"a"), Some(1));
/// assert_eq!(cache.get(&"b"), None);
/// assert_eq!(cache.get(&"c"), Some(3));
/// ```
pub struct Cache<K, V> {
    capacity: usize,
    entries: FxHashMap<K, V>,
    eviction: Box<dyn EvictionPolicy<K>>,
    expiration: Box<dyn ExpirationPolicy<K>>,
    listeners: Vec<Arc<dyn CacheListener<K, V>>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a cache that never expires entries.
    ///
    /// Fails with [`ConfigError`] when `capacity` is zero.
    pub fn new(
        capacity: usize,
        eviction: Box<dyn EvictionPolicy<K>>,
    ) -> Result<Self, ConfigError> {
        Self::with_expiration(capacity, eviction, Box::new(NoExpiration))
    }

    /// Creates a cache with both an eviction and an expiration policy.
    ///
    /// Fails with [`ConfigError`] when `capacity` is zero.
    pub fn with_expiration(
        capacity: usize,
        eviction: Box<dyn EvictionPolicy<K>>,
        expiration: Box<dyn ExpirationPolicy<K>>,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("capacity must be greater than zero"));
        }
        Ok(Self {
            capacity,
            entries: FxHashMap::default(),
            eviction,
            expiration,
            listeners: Vec::new(),
        })
    }

    /// Returns the value for `key`, refreshing its recency.
    ///
    /// An entry past its deadline is removed here (lazy expiration) and
    /// reported as a miss. Emits exactly one of hit, (expire then miss), or
    /// miss.
    pub fn get(&mut self, key: &K) -> Option<V> {
        if !self.entries.contains_key(key) {
            self.notify(|l| l.on_miss(key));
            return None;
        }

        if self.expiration.is_expired(key) {
            self.entries.remove(key);
            self.eviction.on_remove(key);
            self.expiration.on_remove(key);
            self.notify(|l| l.on_expire(key));
            self.notify(|l| l.on_miss(key));
            return None;
        }

        self.eviction.on_access(key);
        self.expiration.on_access(key);
        self.notify(|l| l.on_hit(key));
        self.entries.get(key).cloned()
    }

    /// Inserts or updates `key`, letting the expiration policy pick the TTL.
    pub fn put(&mut self, key: K, value: V) {
        self.put_impl(key, value, None);
    }

    /// Inserts or updates `key` with an explicit TTL.
    ///
    /// The TTL is honoured by per-key expiration policies and ignored by
    /// fixed ones.
    pub fn put_with_ttl(&mut self, key: K, value: V, ttl: Duration) {
        self.put_impl(key, value, Some(ttl));
    }

    fn put_impl(&mut self, key: K, value: V, ttl: Option<Duration>) {
        if let Some(slot) = self.entries.get_mut(&key) {
            // Update path: capacity is unaffected, TTL metadata is rebuilt
            // from the TTL supplied with this call.
            let old = std::mem::replace(slot, value);
            self.eviction.on_access(&key);
            self.expiration.on_remove(&key);
            self.expiration.on_insert(key.clone(), ttl);
            let new = &self.entries[&key];
            self.notify(|l| l.on_update(&key, &old, new));
            return;
        }

        if self.entries.len() >= self.capacity {
            self.evict_one();
        }

        self.entries.insert(key.clone(), value);
        self.eviction.on_insert(key.clone());
        self.expiration.on_insert(key.clone(), ttl);
        let value = &self.entries[&key];
        self.notify(|l| l.on_insert(&key, value));
    }

    /// Removes one entry chosen by the eviction policy.
    ///
    /// Only reachable with `len == capacity >= 1`, so the policy cannot be
    /// empty here unless a policy implementation broke invariant bookkeeping.
    fn evict_one(&mut self) {
        let victim = self
            .eviction
            .select_victim()
            .expect("eviction policy empty while cache is at capacity");

        if let Some(value) = self.entries.remove(&victim) {
            self.eviction.on_remove(&victim);
            self.expiration.on_remove(&victim);
            self.notify(|l| l.on_evict(&victim, &value));
        }
    }

    /// Removes `key`. Returns `true` (and emits a remove event) iff the
    /// entry existed.
    pub fn remove(&mut self, key: &K) -> bool {
        if self.entries.remove(key).is_none() {
            return false;
        }
        self.eviction.on_remove(key);
        self.expiration.on_remove(key);
        self.notify(|l| l.on_remove(key));
        true
    }

    /// Drops every entry and all policy metadata. Emits a single clear
    /// event carrying the prior size.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        self.eviction.clear();
        self.expiration.clear();
        self.notify(|l| l.on_clear(count));
    }

    /// Returns `true` if `key` is present and not expired. Does not touch
    /// recency, does not delete, emits nothing.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key) && !self.expiration.is_expired(key)
    }

    /// Returns the number of entries, counting expired-but-unswept ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Swaps the eviction policy.
    ///
    /// The old policy's metadata is discarded; every live key is registered
    /// with the new policy as a fresh insert, so prior recency/frequency
    /// standing is deliberately lost.
    pub fn set_eviction_policy(&mut self, policy: Box<dyn EvictionPolicy<K>>) {
        self.eviction = policy;
        for key in self.entries.keys() {
            self.eviction.on_insert(key.clone());
        }
    }

    /// Swaps the expiration policy.
    ///
    /// Every live key is registered with the new policy without a custom
    /// TTL; deadlines recorded by the old policy are discarded.
    pub fn set_expiration_policy(&mut self, policy: Box<dyn ExpirationPolicy<K>>) {
        self.expiration = policy;
        for key in self.entries.keys() {
            self.expiration.on_insert(key.clone(), None);
        }
    }

    /// Returns the remaining lifetime of `key`: `None` when absent or
    /// infinite, zero when already past its deadline.
    pub fn time_to_live(&self, key: &K) -> Option<Duration> {
        if !self.entries.contains_key(key) {
            return None;
        }
        self.expiration.time_to_live(key)
    }

    /// Sweeps every entry whose deadline has passed, emitting an expire
    /// event per removal (no remove events). Returns the number removed.
    pub fn remove_expired(&mut self) -> usize {
        let mut removed = 0;
        for key in self.expiration.collect_expired() {
            if self.entries.remove(&key).is_none() {
                continue;
            }
            self.eviction.on_remove(&key);
            self.expiration.on_remove(&key);
            self.notify(|l| l.on_expire(&key));
            removed += 1;
        }
        removed
    }

    /// Subscribes a listener. One handle may be registered on several
    /// caches; registering the same handle twice delivers every event twice.
    pub fn add_listener(&mut self, listener: Arc<dyn CacheListener<K, V>>) {
        self.listeners.push(listener);
    }

    /// Unsubscribes by handle identity, dropping every copy of the handle.
    pub fn remove_listener(&mut self, listener: &Arc<dyn CacheListener<K, V>>) {
        self.listeners.retain(|l| !Arc::ptr_eq(l, listener));
    }

    /// Returns the number of registered listener handles.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Delivers one event to every listener. Skips all work when nobody is
    /// subscribed. A panicking listener is contained and logged; the
    /// triggering cache operation proceeds normally.
    fn notify<F>(&self, event: F)
    where
        F: Fn(&dyn CacheListener<K, V>),
    {
        if self.listeners.is_empty() {
            return;
        }
        for listener in &self.listeners {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| event(listener.as_ref())));
            if outcome.is_err() {
                log::error!("cache listener panicked; event dropped for this listener");
            }
        }
    }
}
