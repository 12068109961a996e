//! Single-lock thread-safe cache wrapper.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::cache::Cache;
use crate::expiry::ExpirationPolicy;
use crate::listener::CacheListener;
use crate::policy::EvictionPolicy;

/// Thread-safe decorator serialising all access through one
/// `parking_lot::RwLock`.
///
/// `get` takes the lock exclusively even though it is logically a read:
/// a hit reorders recency metadata and may lazily delete an expired entry,
/// both of which mutate the core. Only the pure observers (`len`,
/// `capacity`, `contains`, `time_to_live`) take the shared lock. Workloads
/// that need read scaling should use
/// [`ShardedCache`](crate::concurrent::ShardedCache) instead.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use cachecore::cache::Cache;
/// use cachecore::concurrent::ConcurrentCache;
/// use cachecore::policy::LruPolicy;
///
/// let cache = Arc::new(ConcurrentCache::new(
///     Cache::new(100, Box::new(LruPolicy::new())).unwrap(),
/// ));
///
/// let writer = Arc::clone(&cache);
/// std::thread::spawn(move || writer.put(1u64, "one".to_string()))
///     .join()
///     .unwrap();
/// assert_eq!(cache.get(&1), Some("one".to_string()));
/// ```
pub struct ConcurrentCache<K, V> {
    inner: RwLock<Cache<K, V>>,
}

impl<K, V> ConcurrentCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Wraps a cache. The wrapper introduces no new events and no policy
    /// behaviour of its own.
    pub fn new(inner: Cache<K, V>) -> Self {
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// See [`Cache::get`]. Exclusive lock: a hit mutates recency/TTL state.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.write().get(key)
    }

    /// See [`Cache::put`].
    pub fn put(&self, key: K, value: V) {
        self.inner.write().put(key, value);
    }

    /// See [`Cache::put_with_ttl`].
    pub fn put_with_ttl(&self, key: K, value: V, ttl: Duration) {
        self.inner.write().put_with_ttl(key, value, ttl);
    }

    /// See [`Cache::remove`].
    pub fn remove(&self, key: &K) -> bool {
        self.inner.write().remove(key)
    }

    /// See [`Cache::clear`].
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// See [`Cache::contains`]. Shared lock.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.read().contains(key)
    }

    /// See [`Cache::len`]. Shared lock.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// See [`Cache::is_empty`]. Shared lock.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// See [`Cache::capacity`]. Shared lock.
    pub fn capacity(&self) -> usize {
        self.inner.read().capacity()
    }

    /// See [`Cache::time_to_live`]. Shared lock.
    pub fn time_to_live(&self, key: &K) -> Option<Duration> {
        self.inner.read().time_to_live(key)
    }

    /// See [`Cache::remove_expired`].
    pub fn remove_expired(&self) -> usize {
        self.inner.write().remove_expired()
    }

    /// See [`Cache::set_eviction_policy`].
    pub fn set_eviction_policy(&self, policy: Box<dyn EvictionPolicy<K>>) {
        self.inner.write().set_eviction_policy(policy);
    }

    /// See [`Cache::set_expiration_policy`].
    pub fn set_expiration_policy(&self, policy: Box<dyn ExpirationPolicy<K>>) {
        self.inner.write().set_expiration_policy(policy);
    }

    /// See [`Cache::add_listener`].
    pub fn add_listener(&self, listener: Arc<dyn CacheListener<K, V>>) {
        self.inner.write().add_listener(listener);
    }

    /// See [`Cache::remove_listener`].
    pub fn remove_listener(&self, listener: &Arc<dyn CacheListener<K, V>>) {
        self.inner.write().remove_listener(listener);
    }

    /// Runs `f` with the inner cache under the exclusive lock, enabling
    /// atomic compound operations:
    ///
    /// ```
    /// # use cachecore::cache::Cache;
    /// # use cachecore::concurrent::ConcurrentCache;
    /// # use cachecore::policy::LruPolicy;
    /// # let cache = ConcurrentCache::new(
    /// #     Cache::new(10, Box::new(LruPolicy::new())).unwrap());
    /// // check-then-act without a race window
    /// cache.with_exclusive(|inner| {
    ///     if !inner.contains(&"config") {
    ///         inner.put("config", 42);
    ///     }
    /// });
    /// ```
    pub fn with_exclusive<R>(&self, f: impl FnOnce(&mut Cache<K, V>) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Runs `f` with the inner cache under the shared lock. `f` must stick
    /// to non-mutating operations.
    pub fn with_shared<R>(&self, f: impl FnOnce(&Cache<K, V>) -> R) -> R {
        f(&self.inner.read())
    }
}
