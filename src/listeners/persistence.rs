//! Bridge from cache lifecycle events to a persistence backend.
//!
//! The cache knows nothing about storage; this listener translates its
//! events into the three mutations a backing store needs. What the backend
//! does with them (snapshot files, a database, a remote store) is its own
//! business.

use std::sync::Arc;

use crate::listener::CacheListener;

/// Storage abstraction kept in sync with a cache's live contents.
///
/// Implementations must tolerate redundant calls: `on_remove` may arrive
/// for keys the backend never saw (e.g. an expired entry inserted before
/// the listener was registered).
pub trait PersistenceBackend<K, V>: Send + Sync {
    /// A key now maps to `value`.
    fn on_put(&self, key: &K, value: &V);

    /// A key is gone (removed, evicted or expired).
    fn on_remove(&self, key: &K);

    /// Everything is gone.
    fn on_clear(&self);

    /// Pushes buffered writes down, if the backend buffers. Default no-op.
    fn flush(&self) {}
}

/// Listener that mirrors mutating events onto a [`PersistenceBackend`].
///
/// Hits and misses change nothing and are ignored. Eviction, expiration and
/// explicit removal are indistinguishable to the backend: the key is gone.
///
/// Heavy backends should be registered through the
/// [`ThreadPerListenerDispatcher`](crate::listeners::ThreadPerListenerDispatcher)
/// so store latency never stalls cache operations.
pub struct PersistenceListener<K, V> {
    backend: Arc<dyn PersistenceBackend<K, V>>,
}

impl<K, V> PersistenceListener<K, V> {
    /// Creates a listener writing through to `backend`.
    pub fn new(backend: Arc<dyn PersistenceBackend<K, V>>) -> Self {
        Self { backend }
    }

    /// Forwards a flush request to the backend.
    pub fn flush(&self) {
        self.backend.flush();
    }

    /// Returns the wrapped backend, e.g. to preload the cache from it
    /// before registering the listener.
    pub fn backend(&self) -> Arc<dyn PersistenceBackend<K, V>> {
        self.backend.clone()
    }
}

impl<K, V> CacheListener<K, V> for PersistenceListener<K, V>
where
    K: Send + Sync,
    V: Send + Sync,
{
    fn on_insert(&self, key: &K, value: &V) {
        self.backend.on_put(key, value);
    }

    fn on_update(&self, key: &K, _old_value: &V, new_value: &V) {
        self.backend.on_put(key, new_value);
    }

    fn on_evict(&self, key: &K, _value: &V) {
        self.backend.on_remove(key);
    }

    fn on_expire(&self, key: &K) {
        self.backend.on_remove(key);
    }

    fn on_remove(&self, key: &K) {
        self.backend.on_remove(key);
    }

    fn on_clear(&self, _count: usize) {
        self.backend.on_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    use crate::cache::Cache;
    use crate::policy::LruPolicy;

    #[derive(Default)]
    struct MapBackend {
        entries: Mutex<std::collections::HashMap<String, i32>>,
        flushes: Mutex<usize>,
    }

    impl PersistenceBackend<String, i32> for MapBackend {
        fn on_put(&self, key: &String, value: &i32) {
            self.entries.lock().insert(key.clone(), *value);
        }

        fn on_remove(&self, key: &String) {
            self.entries.lock().remove(key);
        }

        fn on_clear(&self) {
            self.entries.lock().clear();
        }

        fn flush(&self) {
            *self.flushes.lock() += 1;
        }
    }

    fn cache_with_backend() -> (Cache<String, i32>, Arc<MapBackend>) {
        let backend = Arc::new(MapBackend::default());
        let mut cache: Cache<String, i32> = Cache::new(2, Box::new(LruPolicy::new())).unwrap();
        cache.add_listener(Arc::new(PersistenceListener::new(backend.clone())));
        (cache, backend)
    }

    #[test]
    fn inserts_and_updates_reach_the_backend() {
        let (mut cache, backend) = cache_with_backend();
        cache.put("a".to_string(), 1);
        cache.put("a".to_string(), 2);
        assert_eq!(backend.entries.lock().get("a"), Some(&2));
    }

    #[test]
    fn eviction_and_removal_delete_from_backend() {
        let (mut cache, backend) = cache_with_backend();
        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        cache.put("c".to_string(), 3); // evicts "a"
        assert!(!backend.entries.lock().contains_key("a"));

        cache.remove(&"b".to_string());
        assert!(!backend.entries.lock().contains_key("b"));
        assert_eq!(backend.entries.lock().len(), 1);
    }

    #[test]
    fn clear_empties_the_backend() {
        let (mut cache, backend) = cache_with_backend();
        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        cache.clear();
        assert!(backend.entries.lock().is_empty());
    }

    #[test]
    fn hits_and_misses_do_not_touch_the_backend() {
        let (mut cache, backend) = cache_with_backend();
        cache.put("a".to_string(), 1);
        cache.get(&"a".to_string());
        cache.get(&"ghost".to_string());
        assert_eq!(backend.entries.lock().len(), 1);
    }

    #[test]
    fn flush_is_forwarded() {
        let backend = Arc::new(MapBackend::default());
        let listener = PersistenceListener::new(backend.clone());
        listener.flush();
        assert_eq!(*backend.flushes.lock(), 1);
    }
}
