use chrono::{DateTime, Utc};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::TaskError;
use crate::model::task::{IntervalUnit, Task, TaskColor};
use crate::repository::TaskRepository;

/// Result of resolving a typed id prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdLookup {
    Found(Uuid),
    Missing,
    Ambiguous(Vec<Uuid>),
}

/// The in-memory task collection and the only way to mutate it.
///
/// Every mutation is written through to the repository before returning.
/// Write failures are logged and otherwise ignored.
///
/// Other processes may write the same slot. Each mutation first picks up
/// their changes, so a long-running store never overwrites them with a
/// stale copy.
pub struct TaskStore<R: TaskRepository> {
    repo: R,
    tasks: Vec<Task>,
    /// The slot contents as of our last load or successful write.
    synced: Vec<Task>,
}

impl<R: TaskRepository> TaskStore<R> {
    /// Loads the collection once. Stored order is kept as is.
    pub fn open(repo: R) -> Self {
        let tasks = repo.load_all();
        debug!("task store opened with {} tasks", tasks.len());
        Self {
            repo,
            synced: tasks.clone(),
            tasks,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Tasks by ascending next reminder, as of the last `add`.
    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == *id)
    }

    pub fn find_by_prefix(&self, prefix: &str) -> IdLookup {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return IdLookup::Missing;
        }

        let matches: Vec<Uuid> = self
            .tasks
            .iter()
            .filter(|t| t.id.to_string().starts_with(&prefix))
            .map(|t| t.id)
            .collect();

        match matches.len() {
            0 => IdLookup::Missing,
            1 => IdLookup::Found(matches[0]),
            _ => IdLookup::Ambiguous(matches),
        }
    }

    pub fn add(
        &mut self,
        title: &str,
        interval_value: i64,
        interval_unit: IntervalUnit,
        color: TaskColor,
    ) -> Result<Task, TaskError> {
        self.add_at(title, interval_value, interval_unit, color, Utc::now())
    }

    pub fn add_at(
        &mut self,
        title: &str,
        interval_value: i64,
        interval_unit: IntervalUnit,
        color: TaskColor,
        now: DateTime<Utc>,
    ) -> Result<Task, TaskError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        let value = u32::try_from(interval_value)
            .ok()
            .filter(|v| *v >= 1)
            .ok_or(TaskError::InvalidInterval(interval_value))?;

        let task = Task::new(title.to_string(), value, interval_unit, color, now);
        self.refresh();
        debug!(id = %task.id, "adding task '{}' every {}", task.title, task.interval_label());

        self.tasks.push(task.clone());
        self.tasks.sort_by_key(|t| t.next_notification_at);
        self.persist();
        Ok(task)
    }

    /// Pauses a running task or resumes a paused one. Unknown ids are
    /// ignored.
    pub fn toggle(&mut self, id: &Uuid) -> Option<&Task> {
        self.toggle_at(id, Utc::now())
    }

    pub fn toggle_at(&mut self, id: &Uuid, now: DateTime<Utc>) -> Option<&Task> {
        self.refresh();
        let pos = self.tasks.iter().position(|t| t.id == *id)?;

        let task = &mut self.tasks[pos];
        if task.active {
            task.pause();
            debug!(id = %task.id, "paused task");
        } else {
            task.resume(now);
            debug!(id = %task.id, next = %task.next_notification_at, "resumed task");
        }

        self.persist();
        self.tasks.get(pos)
    }

    /// Removes the task. Unknown ids are ignored and nothing is written.
    pub fn delete(&mut self, id: &Uuid) -> Option<Task> {
        self.refresh();
        let pos = self.tasks.iter().position(|t| t.id == *id)?;
        let removed = self.tasks.remove(pos);
        debug!(id = %removed.id, "deleted task");
        self.persist();
        Some(removed)
    }

    /// Sets new reminder times in one pass and writes once if anything
    /// changed. Returns how many tasks changed.
    pub fn apply_schedule(&mut self, updates: &[(Uuid, DateTime<Utc>)]) -> usize {
        let mut changed = 0;
        for (id, next) in updates {
            if let Some(task) = self.tasks.iter_mut().find(|t| t.id == *id) {
                if task.next_notification_at != *next {
                    task.next_notification_at = *next;
                    changed += 1;
                }
            }
        }

        if changed > 0 {
            self.persist();
        }
        changed
    }

    /// Re-reads the slot and adopts it if someone else wrote it since our
    /// last load or write. Returns whether the collection was replaced.
    pub fn refresh(&mut self) -> bool {
        let stored = self.repo.load_all();
        if stored == self.synced {
            return false;
        }

        info!("tasks changed on disk, reloading {} tasks", stored.len());
        self.tasks = stored.clone();
        self.synced = stored;
        true
    }

    fn persist(&mut self) {
        match self.repo.save_all(&self.tasks) {
            Ok(()) => self.synced = self.tasks.clone(),
            Err(e) => error!("cannot persist tasks: {e:#}"),
        }
    }
}
