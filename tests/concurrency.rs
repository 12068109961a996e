// ==============================================
// CONCURRENCY SCENARIOS (integration)
// ==============================================
//
// Parallel workloads over the locked and sharded wrappers, plus the
// asynchronous dispatcher's non-blocking and drain guarantees.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use cachecore::cache::Cache;
use cachecore::concurrent::{ConcurrentCache, ShardedCache};
use cachecore::listener::CacheListener;
use cachecore::listeners::{StatsListener, ThreadPerListenerDispatcher};
use cachecore::policy::LruPolicy;

fn lru(capacity: usize) -> Result<Cache<u64, u64>, cachecore::error::ConfigError> {
    Cache::new(capacity, Box::new(LruPolicy::new()))
}

// ==============================================
// Sharded wrapper under parallel writers
// ==============================================

#[test]
fn sharded_parallel_disjoint_writers() {
    let cache: Arc<ShardedCache<u64, u64>> =
        Arc::new(ShardedCache::new(2000, 4, |capacity| lru(capacity)).unwrap());

    let mut handles = Vec::new();
    for worker in 0..4u64 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            // Disjoint key ranges per worker.
            for i in 0..250u64 {
                let key = worker * 1000 + i;
                cache.put(key, key * 2);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.len(), 1000);
    for worker in 0..4u64 {
        for i in 0..250u64 {
            let key = worker * 1000 + i;
            assert_eq!(cache.get(&key), Some(key * 2));
        }
    }
}

#[test]
fn sharded_parallel_mixed_readers_and_writers() {
    let cache: Arc<ShardedCache<u64, u64>> =
        Arc::new(ShardedCache::new(4096, 8, |capacity| lru(capacity)).unwrap());

    for key in 0..512u64 {
        cache.put(key, key);
    }

    let mut handles = Vec::new();
    for worker in 0..8u64 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..512u64 {
                if worker % 2 == 0 {
                    cache.put(1000 + worker * 512 + i, i);
                } else {
                    let _ = cache.get(&(i % 512));
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // 512 preloaded + 4 writers x 512 fresh keys, all within capacity.
    assert_eq!(cache.len(), 512 + 4 * 512);
}

// ==============================================
// Exclusive-lock wrapper
// ==============================================

#[test]
fn concurrent_cache_parallel_writers() {
    let cache = Arc::new(ConcurrentCache::new(lru(1024).unwrap()));

    let mut handles = Vec::new();
    for worker in 0..8u64 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..128u64 {
                cache.put(worker * 128 + i, i);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.len(), 1024);
}

#[test]
fn with_exclusive_makes_check_then_act_atomic() {
    let cache = Arc::new(ConcurrentCache::new(lru(64).unwrap()));
    let insertions = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = Arc::clone(&cache);
        let insertions = Arc::clone(&insertions);
        handles.push(thread::spawn(move || {
            for _ in 0..100 {
                cache.with_exclusive(|inner| {
                    if !inner.contains(&42) {
                        inner.put(42, 42);
                        insertions.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // Only the first check-then-act can ever see the key absent.
    assert_eq!(insertions.load(Ordering::SeqCst), 1);
    assert_eq!(cache.get(&42), Some(42));
}

// ==============================================
// Async dispatcher: producer latency and drain
// ==============================================

struct SlowCounter {
    seen: AtomicUsize,
    delay: Duration,
}

impl SlowCounter {
    fn new(delay: Duration) -> Self {
        Self {
            seen: AtomicUsize::new(0),
            delay,
        }
    }
}

impl CacheListener<u64, u64> for SlowCounter {
    fn on_insert(&self, _key: &u64, _value: &u64) {
        thread::sleep(self.delay);
        self.seen.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn dispatcher_keeps_producer_fast_and_drains_on_stop() {
    let slow = Arc::new(SlowCounter::new(Duration::from_millis(10)));
    let dispatcher: Arc<ThreadPerListenerDispatcher<u64, u64>> =
        Arc::new(ThreadPerListenerDispatcher::new());
    dispatcher.add_listener(slow.clone());

    let mut cache = lru(256).unwrap();
    cache.add_listener(dispatcher.clone());

    // 100 inserts at 10 ms of listener work each is a second of listener
    // time; the producing thread must not pay for any of it.
    let started = Instant::now();
    for i in 0..100u64 {
        cache.put(i, i);
    }
    let produce_elapsed = started.elapsed();
    assert!(
        produce_elapsed < Duration::from_millis(100),
        "producer blocked for {produce_elapsed:?}"
    );

    dispatcher.stop();
    assert_eq!(slow.seen.load(Ordering::SeqCst), 100);
}

#[test]
fn dispatcher_preserves_per_listener_fifo() {
    struct OrderCheck {
        last: AtomicUsize,
        violations: AtomicUsize,
    }
    impl CacheListener<u64, u64> for OrderCheck {
        fn on_insert(&self, key: &u64, _value: &u64) {
            let previous = self.last.swap(*key as usize, Ordering::SeqCst);
            if previous > *key as usize {
                self.violations.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    let check = Arc::new(OrderCheck {
        last: AtomicUsize::new(0),
        violations: AtomicUsize::new(0),
    });
    let dispatcher: Arc<ThreadPerListenerDispatcher<u64, u64>> =
        Arc::new(ThreadPerListenerDispatcher::new());
    dispatcher.add_listener(check.clone());

    let mut cache = lru(2048).unwrap();
    cache.add_listener(dispatcher.clone());
    for i in 1..=1000u64 {
        cache.put(i, i);
    }
    dispatcher.stop();

    assert_eq!(check.violations.load(Ordering::SeqCst), 0);
    assert_eq!(check.last.load(Ordering::SeqCst), 1000);
}

#[test]
fn dispatcher_fans_out_to_independent_listeners() {
    let fast = Arc::new(StatsListener::new());
    let slow = Arc::new(SlowCounter::new(Duration::from_millis(5)));

    let dispatcher: Arc<ThreadPerListenerDispatcher<u64, u64>> =
        Arc::new(ThreadPerListenerDispatcher::new());
    dispatcher.add_listener(fast.clone());
    dispatcher.add_listener(slow.clone());
    assert_eq!(dispatcher.listener_count(), 2);

    let mut cache = lru(64).unwrap();
    cache.add_listener(dispatcher.clone());
    for i in 0..20u64 {
        cache.put(i, i);
    }

    dispatcher.stop();
    assert_eq!(fast.inserts(), 20);
    assert_eq!(slow.seen.load(Ordering::SeqCst), 20);
}

// ==============================================
// Wrapper + dispatcher composition
// ==============================================

#[test]
fn sharded_cache_with_async_stats() {
    let stats = Arc::new(StatsListener::new());
    let dispatcher: Arc<ThreadPerListenerDispatcher<u64, u64>> =
        Arc::new(ThreadPerListenerDispatcher::new());
    dispatcher.add_listener(stats.clone());

    let cache: Arc<ShardedCache<u64, u64>> =
        Arc::new(ShardedCache::new(1024, 4, |capacity| lru(capacity)).unwrap());
    cache.add_listener(dispatcher.clone());

    let mut handles = Vec::new();
    for worker in 0..4u64 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..100u64 {
                cache.put(worker * 100 + i, i);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    dispatcher.stop();
    assert_eq!(stats.inserts(), 400);
}
