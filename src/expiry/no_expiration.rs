//! Null-object expiration policy: entries live until evicted or removed.

use std::time::Duration;

use crate::expiry::ExpirationPolicy;

/// Policy under which nothing ever expires.
///
/// Every predicate is constant and no metadata is stored, so this is the
/// zero-overhead default for caches that only need capacity eviction.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExpiration;

impl<K> ExpirationPolicy<K> for NoExpiration {
    fn is_expired(&self, _key: &K) -> bool {
        false
    }

    fn on_insert(&mut self, _key: K, _custom_ttl: Option<Duration>) {}

    fn on_access(&mut self, _key: &K) {}

    fn on_remove(&mut self, _key: &K) {}

    fn clear(&mut self) {}

    fn collect_expired(&self) -> Vec<K> {
        Vec::new()
    }

    fn time_to_live(&self, _key: &K) -> Option<Duration> {
        None
    }
}
