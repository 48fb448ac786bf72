use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;

use crate::model::task::Task;
use crate::repository::slot;
use crate::repository::traits::TaskRepository;

#[derive(Debug, Default)]
struct Slot {
    text: Option<String>,
    writes: usize,
}

/// Keeps the slot as text in memory. Clones share the same slot, so a test
/// can hand one clone to a store and inspect the other.
#[derive(Clone, Debug, Default)]
pub struct MemoryTaskRepository {
    slot: Arc<Mutex<Slot>>,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with raw slot text, valid or not.
    pub fn with_text(text: impl Into<String>) -> Self {
        let repo = Self::default();
        repo.lock().text = Some(text.into());
        repo
    }

    pub fn text(&self) -> Option<String> {
        self.lock().text.clone()
    }

    /// Number of `save_all` calls so far.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TaskRepository for MemoryTaskRepository {
    fn load_all(&self) -> Vec<Task> {
        match self.text() {
            Some(text) => slot::decode_or_empty(&text, "memory"),
            None => Vec::new(),
        }
    }

    fn save_all(&self, tasks: &[Task]) -> Result<()> {
        let text = slot::encode(tasks)?;
        let mut slot = self.lock();
        slot.text = Some(text);
        slot.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{IntervalUnit, TaskColor};
    use chrono::Utc;

    #[test]
    fn test_clones_share_slot() {
        let repo = MemoryTaskRepository::new();
        let other = repo.clone();
        let task = Task::new("Walk".to_string(), 1, IntervalUnit::Hours, TaskColor::Orange, Utc::now());

        repo.save_all(std::slice::from_ref(&task)).unwrap();
        assert_eq!(other.load_all(), vec![task]);
        assert_eq!(other.writes(), 1);
    }

    #[test]
    fn test_round_trip_without_mutation_is_noop() {
        let now = Utc::now();
        let seed = MemoryTaskRepository::new();
        seed.save_all(&[
            Task::new("A".to_string(), 1, IntervalUnit::Minutes, TaskColor::Blue, now),
            Task::new("B".to_string(), 1, IntervalUnit::Days, TaskColor::Purple, now),
        ])
        .unwrap();
        let before = seed.text();

        seed.save_all(&seed.load_all()).unwrap();
        assert_eq!(seed.text(), before);
    }

    #[test]
    fn test_garbage_slot_loads_empty() {
        let repo = MemoryTaskRepository::with_text("not json at all");
        assert!(repo.load_all().is_empty());
        assert_eq!(repo.writes(), 0);
    }
}
