pub mod scheduler;
pub mod task_store;
