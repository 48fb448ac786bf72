use crate::model::task::Task;
use anyhow::Result;

/// One storage slot holding the whole task collection.
pub trait TaskRepository {
    /// Everything in the slot, or an empty list when the slot is absent or
    /// unreadable. Never fails.
    fn load_all(&self) -> Vec<Task>;

    fn save_all(&self, tasks: &[Task]) -> Result<()>;
}
