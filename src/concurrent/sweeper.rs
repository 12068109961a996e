//! Background sweep of expired entries.
//!
//! The cache core never spawns threads: expiration is lazy, and bulk
//! cleanup happens only when someone calls `remove_expired`. This utility
//! is that someone: a single thread waking on a fixed interval. It lives
//! entirely on the public wrapper surface; dropping it (or calling
//! [`stop`](ExpirySweeper::stop)) joins the thread, so no worker outlives
//! its owner.

use std::hash::Hash;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::concurrent::ConcurrentCache;

struct SweeperShared {
    stopped: Mutex<bool>,
    wake: Condvar,
}

/// Periodic expired-entry sweeper for a [`ConcurrentCache`].
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use cachecore::cache::Cache;
/// use cachecore::concurrent::{ConcurrentCache, ExpirySweeper};
/// use cachecore::expiry::GlobalTtl;
/// use cachecore::policy::LruPolicy;
///
/// let cache: Arc<ConcurrentCache<u64, String>> = Arc::new(ConcurrentCache::new(
///     Cache::with_expiration(
///         1000,
///         Box::new(LruPolicy::new()),
///         Box::new(GlobalTtl::new(Duration::from_secs(5)).unwrap()),
///     )
///     .unwrap(),
/// ));
///
/// let sweeper = ExpirySweeper::start(Arc::clone(&cache), Duration::from_secs(1));
/// // ... expired entries now disappear without waiting for a get() ...
/// drop(sweeper); // stops and joins the sweep thread
/// ```
pub struct ExpirySweeper {
    shared: Arc<SweeperShared>,
    handle: Option<JoinHandle<()>>,
}

impl ExpirySweeper {
    /// Spawns a thread sweeping `cache` every `interval`.
    pub fn start<K, V>(cache: Arc<ConcurrentCache<K, V>>, interval: Duration) -> Self
    where
        K: Eq + Hash + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let shared = Arc::new(SweeperShared {
            stopped: Mutex::new(false),
            wake: Condvar::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let handle = std::thread::spawn(move || loop {
            {
                let mut stopped = worker_shared.stopped.lock();
                if *stopped {
                    break;
                }
                let timed_out = worker_shared.wake.wait_for(&mut stopped, interval);
                if *stopped {
                    break;
                }
                if !timed_out.timed_out() {
                    // Spurious wakeup: go back to waiting.
                    continue;
                }
            }
            // Sweep outside the state lock so stop() is never delayed by
            // the cache lock.
            let removed = cache.remove_expired();
            if removed > 0 {
                log::debug!("expiry sweep removed {removed} entries");
            }
        });

        Self {
            shared,
            handle: Some(handle),
        }
    }

    /// Signals the sweep thread and joins it. Idempotent.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        *self.shared.stopped.lock() = true;
        self.shared.wake.notify_all();
        let _ = handle.join();
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        self.stop();
    }
}
