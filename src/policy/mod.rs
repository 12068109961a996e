//! Eviction policies.
//!
//! An [`EvictionPolicy`] tracks per-key recency/frequency metadata on behalf
//! of a cache and picks a victim on demand. The policy owns only key
//! metadata, never values; the cache drives it through the notification
//! hooks and performs the actual removal itself.
//!
//! | Policy | Victim | Tie-break |
//! |--------|--------|-----------|
//! | [`LruPolicy`] | least recently used key | none (every use refreshes recency) |
//! | [`LfuPolicy`] | least frequently used key | least recently used within the frequency |

use crate::error::EmptyPolicyError;

pub mod lfu;
pub mod lru;

pub use lfu::LfuPolicy;
pub use lru::LruPolicy;

/// Strategy interface consumed by the cache core on every operation.
///
/// Implementations must keep exactly one metadata record per tracked key.
/// `on_access` and `on_remove` on unknown keys are no-ops, so the cache can
/// notify unconditionally.
pub trait EvictionPolicy<K>: Send + Sync {
    /// Registers a new key. Called once per inserted key and again for every
    /// live key after a policy swap.
    fn on_insert(&mut self, key: K);

    /// Records a use of an existing key (`get` hit or value update).
    fn on_access(&mut self, key: &K);

    /// Drops all metadata for a key. Called on explicit removal, eviction
    /// and expiration.
    fn on_remove(&mut self, key: &K);

    /// Returns the key that should be evicted next.
    ///
    /// Never removes the victim; the cache performs the removal and then
    /// calls [`on_remove`](Self::on_remove). Fails with [`EmptyPolicyError`]
    /// when no keys are tracked.
    fn select_victim(&mut self) -> Result<K, EmptyPolicyError>;

    /// Returns `true` if no keys are tracked.
    fn is_empty(&self) -> bool;

    /// Drops all metadata.
    fn clear(&mut self);
}
