pub mod queue;
pub mod queue_entry;
pub mod queue_pool;
pub mod queue_store;
