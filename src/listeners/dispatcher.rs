//! Thread-per-listener asynchronous event dispatcher.
//!
//! A composite listener: one instance registers with a cache, wraps any
//! number of real listeners, and hands each of them a dedicated worker
//! thread fed by its own FIFO command queue. Each event becomes a command
//! (a closure capturing the cloned payload) pushed to every queue.
//!
//! ## Architecture
//!
//! ```text
//!   cache ──event──► ThreadPerListenerDispatcher
//!                      │
//!                      ├─► queue A ──► worker thread A ──► listener A
//!                      ├─► queue B ──► worker thread B ──► listener B
//!                      └─► queue C ──► worker thread C ──► listener C
//! ```
//!
//! Guarantees:
//! - The producing thread never blocks beyond the queue locks, however slow
//!   a listener is.
//! - Per listener, commands run in the order the events were emitted.
//! - A slow or panicking listener affects only its own worker; panics are
//!   caught and logged.
//! - [`stop`](ThreadPerListenerDispatcher::stop) (also run on drop) signals
//!   every worker, lets it drain its remaining queue, and joins it, so no
//!   event accepted before the stop is lost and no thread is orphaned.
//!
//! Workers poll their queue with a bounded timeout (the drain poll, default
//! 100 ms) so a stop request is observed promptly even on an idle queue.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;

use crate::ds::sync_queue::SyncQueue;
use crate::listener::CacheListener;

const DEFAULT_DRAIN_POLL: Duration = Duration::from_millis(100);

type Command = Box<dyn FnOnce() + Send>;

struct WorkerEntry<K, V> {
    listener: Arc<dyn CacheListener<K, V>>,
    queue: Arc<SyncQueue<Command>>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

/// Composite listener that runs each wrapped listener on its own thread.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use cachecore::cache::Cache;
/// use cachecore::listeners::{StatsListener, ThreadPerListenerDispatcher};
/// use cachecore::policy::LruPolicy;
///
/// let stats = Arc::new(StatsListener::new());
/// let dispatcher = Arc::new(ThreadPerListenerDispatcher::new());
/// dispatcher.add_listener(stats.clone());
///
/// let mut cache: Cache<u64, String> = Cache::new(10, Box::new(LruPolicy::new())).unwrap();
/// cache.add_listener(dispatcher.clone());
///
/// cache.put(1, "one".to_string());
/// dispatcher.stop(); // drain and join before reading the counters
/// assert_eq!(stats.inserts(), 1);
/// ```
pub struct ThreadPerListenerDispatcher<K, V> {
    entries: Mutex<Vec<WorkerEntry<K, V>>>,
    drain_poll: Duration,
}

impl<K, V> ThreadPerListenerDispatcher<K, V> {
    /// Creates a dispatcher with the default 100 ms drain poll.
    pub fn new() -> Self {
        Self::with_drain_poll(DEFAULT_DRAIN_POLL)
    }

    /// Creates a dispatcher whose workers wake at least every `drain_poll`
    /// to check for shutdown.
    pub fn with_drain_poll(drain_poll: Duration) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            drain_poll,
        }
    }

    /// Wraps `listener` and spawns its worker thread.
    pub fn add_listener(&self, listener: Arc<dyn CacheListener<K, V>>) {
        let queue = Arc::new(SyncQueue::new());
        let running = Arc::new(AtomicBool::new(true));

        let worker_queue = Arc::clone(&queue);
        let worker_running = Arc::clone(&running);
        let drain_poll = self.drain_poll;
        let handle = std::thread::spawn(move || {
            while worker_running.load(Ordering::Acquire) {
                if let Some(command) = worker_queue.pop_timeout(drain_poll) {
                    run_command(command);
                }
            }
            // Shutdown requested: work accepted before the stop still runs.
            while let Some(command) = worker_queue.try_pop() {
                run_command(command);
            }
        });

        self.entries.lock().push(WorkerEntry {
            listener,
            queue,
            running,
            handle: Some(handle),
        });
    }

    /// Unwraps a listener by handle identity: signals its worker, joins it,
    /// and returns `true` if the listener was registered.
    ///
    /// Must not be called from inside a listener callback (the worker
    /// cannot join itself).
    pub fn remove_listener(&self, listener: &Arc<dyn CacheListener<K, V>>) -> bool {
        let entry = {
            let mut entries = self.entries.lock();
            match entries
                .iter()
                .position(|entry| Arc::ptr_eq(&entry.listener, listener))
            {
                Some(pos) => entries.remove(pos),
                None => return false,
            }
        };
        stop_entry(entry);
        true
    }

    /// Stops every worker: each drains the commands still queued for it,
    /// then exits; all threads are joined before this returns. Idempotent.
    pub fn stop(&self) {
        let entries: Vec<_> = std::mem::take(&mut *self.entries.lock());
        for entry in entries {
            stop_entry(entry);
        }
    }

    /// Returns the number of wrapped listeners.
    pub fn listener_count(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns the total number of commands waiting across all queues.
    /// Diagnostic only.
    pub fn queued_len(&self) -> usize {
        self.entries
            .lock()
            .iter()
            .map(|entry| entry.queue.len())
            .sum()
    }

    /// Builds one command per wrapped listener and enqueues it.
    fn broadcast<F>(&self, command_for: F)
    where
        F: Fn(Arc<dyn CacheListener<K, V>>) -> Command,
    {
        let entries = self.entries.lock();
        for entry in entries.iter() {
            entry.queue.push(command_for(Arc::clone(&entry.listener)));
        }
    }
}

fn run_command(command: Command) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(command));
    if outcome.is_err() {
        log::error!("async cache listener panicked; command skipped");
    }
}

fn stop_entry<K, V>(mut entry: WorkerEntry<K, V>) {
    entry.running.store(false, Ordering::Release);
    entry.queue.shutdown();
    if let Some(handle) = entry.handle.take() {
        let _ = handle.join();
    }
}

impl<K, V> Default for ThreadPerListenerDispatcher<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Drop for ThreadPerListenerDispatcher<K, V> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<K, V> CacheListener<K, V> for ThreadPerListenerDispatcher<K, V>
where
    K: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn on_hit(&self, key: &K) {
        let key = key.clone();
        self.broadcast(move |listener| {
            let key = key.clone();
            Box::new(move || listener.on_hit(&key))
        });
    }

    fn on_miss(&self, key: &K) {
        let key = key.clone();
        self.broadcast(move |listener| {
            let key = key.clone();
            Box::new(move || listener.on_miss(&key))
        });
    }

    fn on_insert(&self, key: &K, value: &V) {
        let key = key.clone();
        let value = value.clone();
        self.broadcast(move |listener| {
            let key = key.clone();
            let value = value.clone();
            Box::new(move || listener.on_insert(&key, &value))
        });
    }

    fn on_update(&self, key: &K, old_value: &V, new_value: &V) {
        let key = key.clone();
        let old_value = old_value.clone();
        let new_value = new_value.clone();
        self.broadcast(move |listener| {
            let key = key.clone();
            let old_value = old_value.clone();
            let new_value = new_value.clone();
            Box::new(move || listener.on_update(&key, &old_value, &new_value))
        });
    }

    fn on_evict(&self, key: &K, value: &V) {
        let key = key.clone();
        let value = value.clone();
        self.broadcast(move |listener| {
            let key = key.clone();
            let value = value.clone();
            Box::new(move || listener.on_evict(&key, &value))
        });
    }

    fn on_expire(&self, key: &K) {
        let key = key.clone();
        self.broadcast(move |listener| {
            let key = key.clone();
            Box::new(move || listener.on_expire(&key))
        });
    }

    fn on_remove(&self, key: &K) {
        let key = key.clone();
        self.broadcast(move |listener| {
            let key = key.clone();
            Box::new(move || listener.on_remove(&key))
        });
    }

    fn on_clear(&self, count: usize) {
        self.broadcast(move |listener| Box::new(move || listener.on_clear(count)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct Counter {
        seen: AtomicUsize,
    }

    impl Counter {
        fn new() -> Self {
            Self {
                seen: AtomicUsize::new(0),
            }
        }

        fn seen(&self) -> usize {
            self.seen.load(Ordering::SeqCst)
        }
    }

    impl CacheListener<u64, u64> for Counter {
        fn on_insert(&self, _key: &u64, _value: &u64) {
            self.seen.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn events_reach_the_wrapped_listener() {
        let counter = Arc::new(Counter::new());
        let dispatcher = ThreadPerListenerDispatcher::new();
        dispatcher.add_listener(counter.clone());

        for i in 0..10 {
            dispatcher.on_insert(&i, &i);
        }
        dispatcher.stop();
        assert_eq!(counter.seen(), 10);
    }

    #[test]
    fn stop_drains_pending_commands() {
        struct Slow {
            seen: AtomicUsize,
        }
        impl CacheListener<u64, u64> for Slow {
            fn on_insert(&self, _key: &u64, _value: &u64) {
                std::thread::sleep(Duration::from_millis(1));
                self.seen.fetch_add(1, Ordering::SeqCst);
            }
        }

        let slow = Arc::new(Slow {
            seen: AtomicUsize::new(0),
        });
        let dispatcher = ThreadPerListenerDispatcher::new();
        dispatcher.add_listener(slow.clone());

        for i in 0..50 {
            dispatcher.on_insert(&i, &i);
        }
        dispatcher.stop();
        assert_eq!(slow.seen.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn stop_is_idempotent() {
        let dispatcher: ThreadPerListenerDispatcher<u64, u64> = ThreadPerListenerDispatcher::new();
        dispatcher.add_listener(Arc::new(Counter::new()));
        dispatcher.stop();
        dispatcher.stop();
        assert_eq!(dispatcher.listener_count(), 0);
    }

    #[test]
    fn remove_listener_joins_its_worker() {
        let counter = Arc::new(Counter::new());
        let dispatcher = ThreadPerListenerDispatcher::new();
        let handle: Arc<dyn CacheListener<u64, u64>> = counter.clone();
        dispatcher.add_listener(handle.clone());

        dispatcher.on_insert(&1, &1);
        assert!(dispatcher.remove_listener(&handle));
        // The event was accepted before removal, so it was delivered.
        assert_eq!(counter.seen(), 1);
        assert!(!dispatcher.remove_listener(&handle));
        assert_eq!(dispatcher.listener_count(), 0);
    }

    #[test]
    fn panicking_listener_does_not_kill_its_worker() {
        struct Exploder {
            seen: AtomicUsize,
        }
        impl CacheListener<u64, u64> for Exploder {
            fn on_insert(&self, key: &u64, _value: &u64) {
                if *key == 0 {
                    panic!("listener bug");
                }
                self.seen.fetch_add(1, Ordering::SeqCst);
            }
        }

        let exploder = Arc::new(Exploder {
            seen: AtomicUsize::new(0),
        });
        let dispatcher = ThreadPerListenerDispatcher::new();
        dispatcher.add_listener(exploder.clone());

        dispatcher.on_insert(&0, &0); // panics inside the worker
        dispatcher.on_insert(&1, &1);
        dispatcher.on_insert(&2, &2);
        dispatcher.stop();
        assert_eq!(exploder.seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn listeners_do_not_block_each_other() {
        struct Sleeper;
        impl CacheListener<u64, u64> for Sleeper {
            fn on_insert(&self, _key: &u64, _value: &u64) {
                std::thread::sleep(Duration::from_millis(50));
            }
        }

        let fast = Arc::new(Counter::new());
        let dispatcher = ThreadPerListenerDispatcher::new();
        dispatcher.add_listener(Arc::new(Sleeper));
        dispatcher.add_listener(fast.clone());

        dispatcher.on_insert(&1, &1);

        // The fast listener finishes while the sleeper is still busy.
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while fast.seen() == 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(fast.seen(), 1);
        dispatcher.stop();
    }

    #[test]
    fn drop_stops_workers() {
        let counter = Arc::new(Counter::new());
        {
            let dispatcher = ThreadPerListenerDispatcher::new();
            dispatcher.add_listener(counter.clone());
            dispatcher.on_insert(&1, &1);
        }
        // Drop drained and joined; the event was delivered.
        assert_eq!(counter.seen(), 1);
    }
}
