//! The two periodic processes: the due-check and the countdown display.
//!
//! Both run on one task, so every store mutation happens inside a single
//! tick handler. Cancelling the token stops both timers and hands the store
//! back.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::Config;
use crate::model::task::Task;
use crate::notify::NotificationGateway;
use crate::repository::TaskRepository;
use crate::service::scheduler::ReminderScheduler;
use crate::service::task_store::TaskStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub due_check: Duration,
    pub countdown: Duration,
}

impl Default for Cadence {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for Cadence {
    fn from(config: &Config) -> Self {
        Self {
            due_check: config.due_check_period(),
            countdown: config.countdown_period(),
        }
    }
}

/// Runs reminders until `cancel` fires, then returns the store.
///
/// The first due-check happens one period after start; the countdown is
/// drawn immediately and then every period. Ticks missed while the process
/// was suspended are skipped, never replayed.
pub async fn run_reminders<R, G, F>(
    mut store: TaskStore<R>,
    scheduler: &ReminderScheduler<G>,
    cadence: Cadence,
    cancel: CancellationToken,
    mut on_countdown: F,
) -> TaskStore<R>
where
    R: TaskRepository,
    G: NotificationGateway,
    F: FnMut(&[Task], DateTime<Utc>),
{
    let start = Instant::now();
    let mut due_check = interval_at(start + cadence.due_check, cadence.due_check);
    due_check.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut display = interval_at(start, cadence.countdown);
    display.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("reminder loop started with {} tasks", store.len());

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = due_check.tick() => {
                let report = scheduler.tick(&mut store);
                if !report.is_empty() {
                    debug!("due-check fired {:?}", report.fired);
                }
            }
            _ = display.tick() => on_countdown(store.list(), Utc::now()),
        }
    }

    info!("reminder loop stopped");
    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{IntervalUnit, TaskColor};
    use crate::notify::{Notification, Permission};
    use crate::repository::MemoryTaskRepository;
    use std::cell::RefCell;

    #[derive(Default)]
    struct CountingGateway {
        shown: RefCell<Vec<String>>,
    }

    impl NotificationGateway for CountingGateway {
        fn permission_state(&self) -> Permission {
            Permission::Granted
        }

        fn prompt(&mut self) -> Permission {
            Permission::Granted
        }

        fn show(&self, notification: &Notification) {
            self.shown.borrow_mut().push(notification.tag.clone());
        }

        fn set_permission(&mut self, _permission: Permission) {}
    }

    fn store_with_overdue_task() -> (TaskStore<MemoryTaskRepository>, Task) {
        let mut store = TaskStore::open(MemoryTaskRepository::new());
        let long_ago = Utc::now() - chrono::Duration::minutes(10);
        let task = store
            .add_at("Stretch", 1, IntervalUnit::Minutes, TaskColor::Blue, long_ago)
            .unwrap();
        (store, task)
    }

    #[tokio::test(start_paused = true)]
    async fn test_due_check_fires_and_cancel_returns_store() {
        let (store, task) = store_with_overdue_task();
        let scheduler = ReminderScheduler::new(CountingGateway::default());
        let cancel = CancellationToken::new();
        let stopper = cancel.clone();
        let mut frames = 0;

        let run = run_reminders(store, &scheduler, Cadence::default(), cancel, |_, _| frames += 1);
        let stop = async {
            tokio::time::sleep(Duration::from_secs(6)).await;
            stopper.cancel();
        };
        let (store, ()) = tokio::join!(run, stop);

        assert_eq!(scheduler.gateway().shown.borrow().as_slice(), &[task.id.to_string()]);
        assert!(store.get(&task.id).unwrap().next_notification_at > Utc::now());
        assert!(frames >= 6, "countdown drawn {frames} times");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_first_due_check() {
        let (store, task) = store_with_overdue_task();
        let writes = store.repository().writes();
        let scheduler = ReminderScheduler::new(CountingGateway::default());
        let cancel = CancellationToken::new();
        let stopper = cancel.clone();

        let run = run_reminders(store, &scheduler, Cadence::default(), cancel, |_, _| {});
        let stop = async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            stopper.cancel();
        };
        let (store, ()) = tokio::join!(run, stop);

        assert!(scheduler.gateway().shown.borrow().is_empty());
        assert_eq!(store.get(&task.id), Some(&task));
        assert_eq!(store.repository().writes(), writes);
    }

    #[test]
    fn test_cadence_from_config() {
        let config = Config {
            due_check_secs: 30,
            countdown_secs: 0,
            ..Config::default()
        };
        let cadence = Cadence::from(&config);
        assert_eq!(cadence.due_check, Duration::from_secs(30));
        assert_eq!(cadence.countdown, Duration::from_secs(1));
        assert_eq!(Cadence::default().due_check, Duration::from_secs(5));
    }
}
