//! Expiration (TTL) policies.
//!
//! An [`ExpirationPolicy`] tracks per-key deadlines on a monotonic clock and
//! answers "has this key expired?". Deletion is lazy: the cache consults the
//! policy on access and removes expired entries at that point, or in bulk
//! through `collect_expired`. No background thread lives in a policy.
//!
//! | Variant | Deadline |
//! |---------|----------|
//! | [`NoExpiration`] | never |
//! | [`GlobalTtl`] | insert time + one shared duration |
//! | [`PerKeyTtl`] | per-insert duration, falling back to an optional default |
//!
//! A key without a deadline record has an infinite TTL and is never
//! expired. Time comes from an injected [`Clock`](crate::clock::Clock) so
//! tests can drive expiration deterministically.

use std::time::Duration;

pub mod global_ttl;
pub mod no_expiration;
pub mod per_key_ttl;

pub use global_ttl::GlobalTtl;
pub use no_expiration::NoExpiration;
pub use per_key_ttl::PerKeyTtl;

/// Deadline-tracking interface consumed by the cache core.
pub trait ExpirationPolicy<K>: Send + Sync {
    /// Returns `true` only when `key` has a finite deadline strictly in the
    /// past. Untracked keys are never expired.
    fn is_expired(&self, key: &K) -> bool;

    /// Records a deadline for a newly inserted (or updated) key.
    ///
    /// `custom_ttl` is honoured only by variants with per-key semantics;
    /// fixed variants ignore it.
    fn on_insert(&mut self, key: K, custom_ttl: Option<Duration>);

    /// Hook for sliding-expiration variants. No-op in the fixed-TTL
    /// variants provided here.
    fn on_access(&mut self, key: &K);

    /// Drops any deadline record for a key.
    fn on_remove(&mut self, key: &K);

    /// Drops all deadline records.
    fn clear(&mut self);

    /// Returns a snapshot of the keys whose deadline has passed, in
    /// unspecified order. Does not mutate any metadata.
    fn collect_expired(&self) -> Vec<K>;

    /// Returns the remaining lifetime of a key: `None` when untracked or
    /// infinite, zero when the deadline has already passed.
    fn time_to_live(&self, key: &K) -> Option<Duration>;
}
