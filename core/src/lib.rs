pub mod config;
pub mod countdown;
pub mod error;
pub mod input;
pub mod model;
pub mod notify;
pub mod repository;
pub mod runtime;
pub mod service;
pub mod time;

pub use config::Config;
pub use countdown::{countdown, Countdown};
pub use error::TaskError;
pub use input::{expand_key, parse_add, parse_args, AddRequest, ParsedInput};
pub use model::task::{IntervalUnit, Task, TaskColor};
pub use notify::{Notification, NotificationGateway, Permission, TerminalGateway};
pub use repository::{FileTaskRepository, MemoryTaskRepository, TaskRepository};
pub use runtime::{run_reminders, Cadence};
pub use service::scheduler::{ReminderScheduler, TickReport};
pub use service::task_store::{IdLookup, TaskStore};
pub use time::{compute_next, compute_next_in, parse_interval};
