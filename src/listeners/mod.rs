//! Ready-made listener implementations.
//!
//! - [`StatsListener`]: atomic hit/miss/churn counters.
//! - [`LoggingListener`]: one log line per event.
//! - [`PersistenceListener`]: mirrors mutating events onto a
//!   [`PersistenceBackend`].
//! - [`ThreadPerListenerDispatcher`]: composite that runs each wrapped
//!   listener on its own worker thread so slow observers never stall the
//!   cache.

pub mod dispatcher;
pub mod logging;
pub mod persistence;
pub mod stats;

pub use dispatcher::ThreadPerListenerDispatcher;
pub use logging::LoggingListener;
pub use persistence::{PersistenceBackend, PersistenceListener};
pub use stats::StatsListener;
