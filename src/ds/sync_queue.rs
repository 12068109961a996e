//! Blocking FIFO queue for the asynchronous event dispatcher.
//!
//! Producers push without blocking (beyond the queue's own lock); consumers
//! pop with a bounded timeout so shutdown is observed promptly. After
//! [`shutdown`](SyncQueue::shutdown), waiting consumers wake immediately and
//! pops keep returning the remaining items until the queue drains, then fail.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

#[derive(Debug)]
struct State<T> {
    items: VecDeque<T>,
    shutdown: bool,
}

/// Unbounded blocking queue with timeout pop and shutdown.
#[derive(Debug)]
pub struct SyncQueue<T> {
    state: Mutex<State<T>>,
    ready: Condvar,
}

impl<T> SyncQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                items: VecDeque::new(),
                shutdown: false,
            }),
            ready: Condvar::new(),
        }
    }

    /// Appends an item and wakes one waiting consumer.
    ///
    /// Items pushed after [`shutdown`](Self::shutdown) are still delivered to
    /// draining consumers.
    pub fn push(&self, item: T) {
        {
            let mut state = self.state.lock();
            state.items.push_back(item);
        }
        self.ready.notify_one();
    }

    /// Pops the front item, waiting up to `timeout` for one to arrive.
    ///
    /// Returns `None` on timeout, or immediately once the queue is shut down
    /// and empty.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            if state.shutdown {
                return None;
            }
            if self.ready.wait_until(&mut state, deadline).timed_out() {
                return state.items.pop_front();
            }
        }
    }

    /// Pops the front item without waiting.
    pub fn try_pop(&self) -> Option<T> {
        self.state.lock().items.pop_front()
    }

    /// Marks the queue as shut down and wakes all waiting consumers.
    ///
    /// The queue stays usable: pushes still land and pops keep returning
    /// queued items, so consumers can drain before exiting.
    pub fn shutdown(&self) {
        {
            let mut state = self.state.lock();
            state.shutdown = true;
        }
        self.ready.notify_all();
    }

    /// Returns `true` if [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.state.lock().shutdown
    }

    /// Returns the number of queued items. Diagnostic only: the value may be
    /// stale the moment it is returned.
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Returns `true` if no items are queued. Diagnostic only.
    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }
}

impl<T> Default for SyncQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
