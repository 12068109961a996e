pub mod arena;
pub mod linked_list;
pub mod sync_queue;

pub use arena::{NodeArena, NodeId};
pub use linked_list::ArenaList;
pub use sync_queue::SyncQueue;
