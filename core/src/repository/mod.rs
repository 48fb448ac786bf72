pub mod file;
pub mod memory;
pub mod slot;
pub mod traits;

// Re-export
pub use file::FileTaskRepository;
pub use memory::MemoryTaskRepository;
pub use traits::TaskRepository;
