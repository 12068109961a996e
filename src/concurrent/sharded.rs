//! Hash-sharded cache for high-concurrency workloads.
//!
//! Splits the key space over N independent `(cache, lock)` shards:
//!
//! ```text
//!   key ──hash──► shard_index ──► ┌─────────┬─────────┬─────────┐
//!                                 │ shard 0 │ shard 1 │ shard 2 │
//!                                 │ RwLock  │ RwLock  │ RwLock  │
//!                                 │ Cache   │ Cache   │ Cache   │
//!                                 └─────────┴─────────┴─────────┘
//! ```
//!
//! A single lock guards the whole of a
//! [`ConcurrentCache`](crate::concurrent::ConcurrentCache); with S shards
//! the contention drops roughly S-fold, because threads working on keys
//! that hash to different shards proceed in parallel.
//!
//! Cross-shard operations (`len`, `clear`, `remove_expired`) visit shards
//! one lock at a time: `len` is a best-effort snapshot and `clear` is not
//! atomic across shards. Within one shard, operations and their events
//! observe a total order; across shards there is no ordering guarantee.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::cache::Cache;
use crate::error::{ConfigError, ShardIndexError};
use crate::listener::CacheListener;

/// Cache wrapper distributing keys over independently locked shards.
///
/// Each shard is a full [`Cache`] built by the caller's factory with
/// capacity `ceil(total_capacity / shard_count)` (at least 1), so the
/// per-shard policies are whatever the factory chooses.
/// [`capacity`](Self::capacity) reports the originally requested total.
///
/// # Example
///
/// ```
/// use cachecore::cache::Cache;
/// use cachecore::concurrent::ShardedCache;
/// use cachecore::policy::LruPolicy;
///
/// let cache: ShardedCache<u64, String> =
///     ShardedCache::new(1000, 8, |shard_capacity| {
///         Cache::new(shard_capacity, Box::new(LruPolicy::new()))
///     })
///     .unwrap();
///
/// cache.put(1, "one".to_string());
/// assert_eq!(cache.get(&1), Some("one".to_string()));
/// assert_eq!(cache.capacity(), 1000);
/// assert_eq!(cache.shard_count(), 8);
/// ```
pub struct ShardedCache<K, V> {
    shards: Box<[RwLock<Cache<K, V>>]>,
    total_capacity: usize,
}

impl<K, V> ShardedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Builds `shard_count` shards through `factory`, handing it the
    /// per-shard capacity.
    ///
    /// Fails with [`ConfigError`] when `total_capacity` or `shard_count`
    /// is zero, or when the factory itself fails.
    pub fn new<F>(
        total_capacity: usize,
        shard_count: usize,
        mut factory: F,
    ) -> Result<Self, ConfigError>
    where
        F: FnMut(usize) -> Result<Cache<K, V>, ConfigError>,
    {
        if total_capacity == 0 {
            return Err(ConfigError::new("total capacity must be greater than zero"));
        }
        if shard_count == 0 {
            return Err(ConfigError::new("shard count must be greater than zero"));
        }

        let shard_capacity = total_capacity.div_ceil(shard_count).max(1);
        let mut shards = Vec::with_capacity(shard_count);
        for _ in 0..shard_count {
            shards.push(RwLock::new(factory(shard_capacity)?));
        }

        Ok(Self {
            shards: shards.into_boxed_slice(),
            total_capacity,
        })
    }

    /// Maps a key to its shard. Deterministic for the lifetime of the
    /// cache: the same key always lands on the same shard.
    fn shard_index(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }

    fn shard(&self, key: &K) -> &RwLock<Cache<K, V>> {
        &self.shards[self.shard_index(key)]
    }

    /// See [`Cache::get`]. Locks only the owning shard, exclusively
    /// (a hit mutates recency/TTL state).
    pub fn get(&self, key: &K) -> Option<V> {
        self.shard(key).write().get(key)
    }

    /// See [`Cache::put`].
    pub fn put(&self, key: K, value: V) {
        self.shard(&key).write().put(key, value);
    }

    /// See [`Cache::put_with_ttl`].
    pub fn put_with_ttl(&self, key: K, value: V, ttl: Duration) {
        self.shard(&key).write().put_with_ttl(key, value, ttl);
    }

    /// See [`Cache::remove`].
    pub fn remove(&self, key: &K) -> bool {
        self.shard(key).write().remove(key)
    }

    /// See [`Cache::contains`]. Shared lock on the owning shard.
    pub fn contains(&self, key: &K) -> bool {
        self.shard(key).read().contains(key)
    }

    /// See [`Cache::time_to_live`]. Shared lock on the owning shard.
    pub fn time_to_live(&self, key: &K) -> Option<Duration> {
        self.shard(key).read().time_to_live(key)
    }

    /// Sum of shard sizes, taking each shard's shared lock in turn. A
    /// best-effort snapshot: shards may change while later ones are read.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    /// Returns `true` if every shard is empty (same snapshot caveat as
    /// [`len`](Self::len)).
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.read().is_empty())
    }

    /// Returns the originally requested total capacity. Rounding the
    /// per-shard capacity up means the shards may jointly hold slightly
    /// more.
    pub fn capacity(&self) -> usize {
        self.total_capacity
    }

    /// Clears shard after shard. Not atomic: concurrent writers may
    /// repopulate early shards before late ones are cleared.
    pub fn clear(&self) {
        for shard in self.shards.iter() {
            shard.write().clear();
        }
    }

    /// Sweeps expired entries shard by shard; returns the total removed.
    pub fn remove_expired(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.write().remove_expired())
            .sum()
    }

    /// Returns the number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Returns the size of one shard, or [`ShardIndexError`] when `index`
    /// is out of bounds.
    pub fn shard_len(&self, index: usize) -> Result<usize, ShardIndexError> {
        match self.shards.get(index) {
            Some(shard) => Ok(shard.read().len()),
            None => Err(ShardIndexError {
                index,
                shards: self.shards.len(),
            }),
        }
    }

    /// Runs `f` on the shard owning `key`, under its exclusive lock.
    /// Compound operations on one key are atomic this way:
    ///
    /// ```
    /// # use cachecore::cache::Cache;
    /// # use cachecore::concurrent::ShardedCache;
    /// # use cachecore::policy::LruPolicy;
    /// # let cache: ShardedCache<&str, i32> = ShardedCache::new(100, 4, |c| {
    /// #     Cache::new(c, Box::new(LruPolicy::new()))
    /// # }).unwrap();
    /// cache.with_shard(&"counter", |shard| {
    ///     let next = shard.get(&"counter").unwrap_or(0) + 1;
    ///     shard.put("counter", next);
    /// });
    /// ```
    pub fn with_shard<R>(&self, key: &K, f: impl FnOnce(&mut Cache<K, V>) -> R) -> R {
        f(&mut self.shard(key).write())
    }

    /// Runs `f` on every shard in turn, each under its exclusive lock.
    pub fn for_each_shard(&self, mut f: impl FnMut(&mut Cache<K, V>)) {
        for shard in self.shards.iter() {
            f(&mut shard.write());
        }
    }

    /// Registers a listener on every shard, so events fire regardless of
    /// which shard a key lands on.
    pub fn add_listener(&self, listener: Arc<dyn CacheListener<K, V>>) {
        for shard in self.shards.iter() {
            shard.write().add_listener(Arc::clone(&listener));
        }
    }

    /// Unregisters a listener handle from every shard.
    pub fn remove_listener(&self, listener: &Arc<dyn CacheListener<K, V>>) {
        for shard in self.shards.iter() {
            shard.write().remove_listener(listener);
        }
    }
}
