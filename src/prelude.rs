pub use crate::builder::{CacheBuilder, EvictionKind, ExpirationKind};
pub use crate::cache::Cache;
pub use crate::clock::{Clock, ManualClock, MonotonicClock};
pub use crate::concurrent::{ConcurrentCache, ExpirySweeper, ShardedCache};
pub use crate::error::{ConfigError, EmptyPolicyError, ShardIndexError};
pub use crate::expiry::{ExpirationPolicy, GlobalTtl, NoExpiration, PerKeyTtl};
pub use crate::listener::CacheListener;
pub use crate::listeners::{
    LoggingListener, PersistenceBackend, PersistenceListener, StatsListener,
    ThreadPerListenerDispatcher,
};
pub use crate::policy::{EvictionPolicy, LfuPolicy, LruPolicy};
