//! Unified cache builder over the policy variants.
//!
//! Hides the boxing of policy trait objects behind a fluent surface.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use cachecore::builder::{CacheBuilder, EvictionKind, ExpirationKind};
//!
//! let mut cache = CacheBuilder::new(100)
//!     .eviction(EvictionKind::Lfu)
//!     .expiration(ExpirationKind::Global(Duration::from_secs(30)))
//!     .build::<u64, String>()
//!     .unwrap();
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some("hello".to_string()));
//! ```

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::Cache;
use crate::clock::{Clock, MonotonicClock};
use crate::error::ConfigError;
use crate::expiry::{ExpirationPolicy, GlobalTtl, NoExpiration, PerKeyTtl};
use crate::policy::{EvictionPolicy, LfuPolicy, LruPolicy};

/// Available eviction strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionKind {
    /// Least Recently Used eviction.
    Lru,
    /// Least Frequently Used eviction (LRU tie-break).
    Lfu,
}

/// Available expiration strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationKind {
    /// Entries never expire.
    None,
    /// One shared TTL for every entry.
    Global(Duration),
    /// Per-entry TTL with an optional default.
    PerKey(Option<Duration>),
}

/// Builder for [`Cache`] instances.
pub struct CacheBuilder {
    capacity: usize,
    eviction: EvictionKind,
    expiration: ExpirationKind,
    clock: Option<Arc<dyn Clock>>,
}

impl CacheBuilder {
    /// Starts a builder for a cache of `capacity` entries, defaulting to
    /// LRU eviction and no expiration.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            eviction: EvictionKind::Lru,
            expiration: ExpirationKind::None,
            clock: None,
        }
    }

    /// Selects the eviction strategy.
    pub fn eviction(mut self, kind: EvictionKind) -> Self {
        self.eviction = kind;
        self
    }

    /// Selects the expiration strategy.
    pub fn expiration(mut self, kind: ExpirationKind) -> Self {
        self.expiration = kind;
        self
    }

    /// Supplies the clock the expiration policy reads. Defaults to the
    /// platform monotonic clock; tests pass a
    /// [`ManualClock`](crate::clock::ManualClock).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the cache.
    ///
    /// Fails with [`ConfigError`] on zero capacity or a zero global TTL.
    pub fn build<K, V>(self) -> Result<Cache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone + Send + Sync + 'static,
        V: Clone,
    {
        let eviction: Box<dyn EvictionPolicy<K>> = match self.eviction {
            EvictionKind::Lru => Box::new(LruPolicy::new()),
            EvictionKind::Lfu => Box::new(LfuPolicy::new()),
        };

        let clock = self.clock.unwrap_or_else(|| Arc::new(MonotonicClock));
        let expiration: Box<dyn ExpirationPolicy<K>> = match self.expiration {
            ExpirationKind::None => Box::new(NoExpiration),
            ExpirationKind::Global(ttl) => Box::new(GlobalTtl::with_clock(ttl, clock)?),
            ExpirationKind::PerKey(default_ttl) => {
                Box::new(PerKeyTtl::with_clock(default_ttl, clock))
            }
        };

        Cache::with_expiration(self.capacity, eviction, expiration)
    }
}
