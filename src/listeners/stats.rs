//! Counting listener for cache effectiveness metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::listener::CacheListener;

/// Listener that counts every event kind.
///
/// Counters are atomics, so one instance can observe a concurrently used
/// cache (or several caches at once) and be read at any time.
///
/// ```
/// use std::sync::Arc;
/// use cachecore::cache::Cache;
/// use cachecore::listeners::StatsListener;
/// use cachecore::policy::LruPolicy;
///
/// let stats = Arc::new(StatsListener::new());
/// let mut cache = Cache::new(10, Box::new(LruPolicy::new())).unwrap();
/// cache.add_listener(stats.clone());
///
/// cache.put("k", 1);
/// cache.get(&"k");
/// cache.get(&"ghost");
///
/// assert_eq!(stats.hits(), 1);
/// assert_eq!(stats.misses(), 1);
/// assert_eq!(stats.hit_rate(), 0.5);
/// ```
#[derive(Debug, Default)]
pub struct StatsListener {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    updates: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
    removes: AtomicU64,
    clears: AtomicU64,
}

impl StatsListener {
    /// Creates a listener with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn inserts(&self) -> u64 {
        self.inserts.load(Ordering::Relaxed)
    }

    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    pub fn expirations(&self) -> u64 {
        self.expirations.load(Ordering::Relaxed)
    }

    pub fn removes(&self) -> u64 {
        self.removes.load(Ordering::Relaxed)
    }

    pub fn clears(&self) -> u64 {
        self.clears.load(Ordering::Relaxed)
    }

    /// Total number of lookups observed (hits + misses).
    pub fn total_requests(&self) -> u64 {
        self.hits() + self.misses()
    }

    /// Fraction of lookups that hit, in `[0.0, 1.0]`; 0.0 before any
    /// lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        self.hits() as f64 / total as f64
    }

    /// Resets every counter to zero.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.inserts.store(0, Ordering::Relaxed);
        self.updates.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        self.expirations.store(0, Ordering::Relaxed);
        self.removes.store(0, Ordering::Relaxed);
        self.clears.store(0, Ordering::Relaxed);
    }
}

impl<K, V> CacheListener<K, V> for StatsListener {
    fn on_hit(&self, _key: &K) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn on_miss(&self, _key: &K) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn on_insert(&self, _key: &K, _value: &V) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    fn on_update(&self, _key: &K, _old_value: &V, _new_value: &V) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    fn on_evict(&self, _key: &K, _value: &V) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    fn on_expire(&self, _key: &K) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    fn on_remove(&self, _key: &K) {
        self.removes.fetch_add(1, Ordering::Relaxed);
    }

    fn on_clear(&self, _count: usize) {
        self.clears.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_track_each_event_kind() {
        let stats = StatsListener::new();
        for _ in 0..3 {
            CacheListener::<u32, u32>::on_hit(&stats, &1);
        }
        for _ in 0..2 {
            CacheListener::<u32, u32>::on_miss(&stats, &1);
        }
        CacheListener::<u32, u32>::on_insert(&stats, &1, &10);
        CacheListener::<u32, u32>::on_update(&stats, &1, &10, &20);
        CacheListener::<u32, u32>::on_evict(&stats, &1, &20);
        CacheListener::<u32, u32>::on_expire(&stats, &1);
        CacheListener::<u32, u32>::on_remove(&stats, &1);
        CacheListener::<u32, u32>::on_clear(&stats, 5);

        assert_eq!(stats.hits(), 3);
        assert_eq!(stats.misses(), 2);
        assert_eq!(stats.inserts(), 1);
        assert_eq!(stats.updates(), 1);
        assert_eq!(stats.evictions(), 1);
        assert_eq!(stats.expirations(), 1);
        assert_eq!(stats.removes(), 1);
        assert_eq!(stats.clears(), 1);
        assert_eq!(stats.total_requests(), 5);
        assert_eq!(stats.hit_rate(), 0.6);
    }

    #[test]
    fn hit_rate_is_zero_without_requests() {
        let stats = StatsListener::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn reset_zeroes_everything() {
        let stats = StatsListener::new();
        CacheListener::<u32, u32>::on_hit(&stats, &1);
        CacheListener::<u32, u32>::on_insert(&stats, &1, &1);
        stats.reset();
        assert_eq!(stats.hits(), 0);
        assert_eq!(stats.inserts(), 0);
        assert_eq!(stats.total_requests(), 0);
    }
}
