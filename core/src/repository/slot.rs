//! Text encoding of the task slot shared by every repository.

use std::collections::HashSet;

use anyhow::Result;
use tracing::warn;

use crate::model::task::Task;

pub fn encode(tasks: &[Task]) -> Result<String> {
    Ok(serde_json::to_string_pretty(tasks)?)
}

/// Parses the slot text. Records that break the collection invariants
/// (empty title, zero interval, repeated id) are dropped individually.
pub fn decode(text: &str) -> Result<Vec<Task>> {
    let tasks: Vec<Task> = serde_json::from_str(text)?;
    let mut seen = HashSet::new();

    Ok(tasks
        .into_iter()
        .filter(|task| {
            if task.title.trim().is_empty() || task.interval_value == 0 {
                warn!(id = %task.id, "dropping stored task with invalid title or interval");
                return false;
            }
            if !seen.insert(task.id) {
                warn!(id = %task.id, "dropping stored task with duplicate id");
                return false;
            }
            true
        })
        .collect())
}

/// `decode`, degrading to an empty collection. `source` names the slot in
/// the log line.
pub fn decode_or_empty(text: &str, source: &str) -> Vec<Task> {
    match decode(text) {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!("stored tasks in {source} are unreadable, starting empty: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{IntervalUnit, TaskColor};
    use chrono::Utc;

    fn task(title: &str, value: u32) -> Task {
        Task::new(title.to_string(), value, IntervalUnit::Minutes, TaskColor::Blue, Utc::now())
    }

    #[test]
    fn test_corrupt_text_becomes_empty() {
        assert!(decode("{not json").is_err());
        assert!(decode_or_empty("{not json", "test").is_empty());
        assert!(decode_or_empty("", "test").is_empty());
        assert!(decode_or_empty(r#"[{"id": 3}]"#, "test").is_empty());
    }

    #[test]
    fn test_invalid_records_are_dropped() {
        let good = task("Stretch", 1);
        let mut zero = task("Zero", 1);
        zero.interval_value = 0;
        let blank = task("   ", 5);
        let dup = good.clone();

        let text = encode(&[good.clone(), zero, blank, dup]).unwrap();
        let decoded = decode(&text).unwrap();
        assert_eq!(decoded, vec![good]);
    }

    #[test]
    fn test_encode_is_stable() {
        let tasks = vec![task("A", 1), task("B", 2)];
        let text = encode(&tasks).unwrap();
        let again = encode(&decode(&text).unwrap()).unwrap();
        assert_eq!(text, again);
    }
}
