//! Listener that logs every cache event.

use std::fmt::Display;

use crate::listener::CacheListener;

/// Logs one line per event through the `log` facade at debug level.
///
/// The prefix distinguishes caches when several are observed at once. Keys
/// and values must be `Display`. To silence it, lower the log level or do
/// not register it.
#[derive(Debug, Clone)]
pub struct LoggingListener {
    prefix: String,
}

impl LoggingListener {
    /// Creates a listener tagging every line with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingListener {
    fn default() -> Self {
        Self::new("cache")
    }
}

impl<K, V> CacheListener<K, V> for LoggingListener
where
    K: Display,
    V: Display,
{
    fn on_hit(&self, key: &K) {
        log::debug!("[{}] HIT: {key}", self.prefix);
    }

    fn on_miss(&self, key: &K) {
        log::debug!("[{}] MISS: {key}", self.prefix);
    }

    fn on_insert(&self, key: &K, value: &V) {
        log::debug!("[{}] INSERT: {key} = {value}", self.prefix);
    }

    fn on_update(&self, key: &K, old_value: &V, new_value: &V) {
        log::debug!("[{}] UPDATE: {key} ({old_value} -> {new_value})", self.prefix);
    }

    fn on_evict(&self, key: &K, value: &V) {
        log::debug!("[{}] EVICT: {key} = {value}", self.prefix);
    }

    fn on_expire(&self, key: &K) {
        log::debug!("[{}] EXPIRE: {key}", self.prefix);
    }

    fn on_remove(&self, key: &K) {
        log::debug!("[{}] REMOVE: {key}", self.prefix);
    }

    fn on_clear(&self, count: usize) {
        log::debug!("[{}] CLEAR: {count} entries", self.prefix);
    }
}
