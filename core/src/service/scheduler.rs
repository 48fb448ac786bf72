use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::notify::{Notification, NotificationGateway};
use crate::repository::TaskRepository;
use crate::service::task_store::TaskStore;
use crate::time::compute_next;

/// What one due-check tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tasks a reminder was delivered for, in list order.
    pub fired: Vec<Uuid>,
    /// Tasks whose next reminder moved.
    pub rescheduled: usize,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }
}

/// Fires reminders for due tasks and pushes their schedule forward.
pub struct ReminderScheduler<G: NotificationGateway> {
    gateway: G,
}

impl<G: NotificationGateway> ReminderScheduler<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn into_gateway(self) -> G {
        self.gateway
    }

    pub fn tick<R: TaskRepository>(&self, store: &mut TaskStore<R>) -> TickReport {
        self.tick_at(store, Utc::now())
    }

    /// One due-check at `now`.
    ///
    /// Each due task fires once and is rescheduled one interval after `now`,
    /// not after its previous slot, so missed intervals are dropped rather
    /// than replayed. The store is written at most once.
    pub fn tick_at<R: TaskRepository>(&self, store: &mut TaskStore<R>, now: DateTime<Utc>) -> TickReport {
        store.refresh();

        let mut fired = Vec::new();
        let mut updates = Vec::new();

        for task in store.list().iter().filter(|t| t.is_due(now)) {
            info!(id = %task.id, "reminder due: {}", task.title);
            self.gateway.deliver(&Notification::reminder(task));

            fired.push(task.id);
            updates.push((task.id, compute_next(task.interval_value, task.interval_unit, now)));
        }

        if fired.is_empty() {
            return TickReport::default();
        }

        let rescheduled = store.apply_schedule(&updates);
        debug!("tick fired {} reminders, rescheduled {}", fired.len(), rescheduled);

        TickReport { fired, rescheduled }
    }
}
