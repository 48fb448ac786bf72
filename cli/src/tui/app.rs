use std::cell::RefCell;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use ratatui::widgets::TableState;
use remindism_core::{
    parse_add, Config, Notification, NotificationGateway, Permission, ReminderScheduler, Task,
    TaskRepository, TaskStore,
};
use tracing::{debug, warn};

pub enum InputMode {
    Normal,
    Adding,
}

/// Shows notifications as a banner line inside the TUI.
pub struct TuiGateway {
    permission: Permission,
    bell: bool,
    banner: RefCell<Option<Notification>>,
}

impl TuiGateway {
    pub fn new(permission: Permission, bell: bool) -> Self {
        Self {
            permission,
            bell,
            banner: RefCell::new(None),
        }
    }

    pub fn banner(&self) -> Option<Notification> {
        self.banner.borrow().clone()
    }

    pub fn dismiss(&self) {
        self.banner.borrow_mut().take();
    }
}

impl NotificationGateway for TuiGateway {
    fn permission_state(&self) -> Permission {
        self.permission
    }

    fn prompt(&mut self) -> Permission {
        if self.permission == Permission::Undetermined {
            self.permission = Permission::Granted;
        }
        self.permission
    }

    fn show(&self, notification: &Notification) {
        if self.bell {
            if let Err(e) = ring_bell() {
                debug!(tag = %notification.tag, "bell not written: {e}");
            }
        }
        *self.banner.borrow_mut() = Some(notification.clone());
    }

    fn set_permission(&mut self, permission: Permission) {
        self.permission = permission;
    }
}

fn ring_bell() -> io::Result<()> {
    let mut out = io::stdout();
    out.write_all(b"\x07")?;
    out.flush()
}

pub struct App<R: TaskRepository> {
    pub store: TaskStore<R>,
    pub scheduler: ReminderScheduler<TuiGateway>,
    pub state: TableState,
    pub input: String,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    pub status: Option<String>,
    pub now: DateTime<Utc>,
    config: Config,
    config_path: PathBuf,
}

impl<R: TaskRepository> App<R> {
    pub fn new(store: TaskStore<R>, config: Config, config_path: PathBuf) -> Self {
        let gateway = TuiGateway::new(config.notification_permission, config.bell);
        let mut state = TableState::default();
        if !store.is_empty() {
            state.select(Some(0));
        }
        App {
            store,
            scheduler: ReminderScheduler::new(gateway),
            state,
            input: String::new(),
            input_mode: InputMode::Normal,
            cursor_position: 0,
            status: None,
            now: Utc::now(),
            config,
            config_path,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.list()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.state.selected().and_then(|i| self.tasks().get(i))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn next(&mut self) {
        let len = self.store.len();
        if len == 0 {
            return;
        }

        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.store.len();
        if len == 0 {
            return;
        }

        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn toggle_selected(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id) else {
            return;
        };
        self.status = self.store.toggle(&id).map(|task| {
            if task.active {
                format!("Resumed: {}", task.title)
            } else {
                format!("Paused: {}", task.title)
            }
        });
        self.clamp_selection();
    }

    pub fn delete_selected(&mut self) {
        let Some(i) = self.state.selected() else {
            return;
        };
        let Some(id) = self.tasks().get(i).map(|t| t.id) else {
            return;
        };
        if let Some(task) = self.store.delete(&id) {
            self.status = Some(format!("Deleted: {}", task.title));
        }

        let len = self.store.len();
        if len == 0 {
            self.state.select(None);
        } else if i >= len {
            self.state.select(Some(len - 1));
        } else {
            self.state.select(Some(i));
        }
    }

    /// Keeps the selection on a row after the list changed under it.
    fn clamp_selection(&mut self) {
        let len = self.store.len();
        match self.state.selected() {
            _ if len == 0 => self.state.select(None),
            Some(i) if i >= len => self.state.select(Some(len - 1)),
            None => self.state.select(Some(0)),
            Some(_) => {}
        }
    }

    pub fn enter_add_mode(&mut self) {
        self.input_mode = InputMode::Adding;
        self.status = None;
        self.input.clear();
        self.cursor_position = 0;
    }

    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn input_char(&mut self, c: char) {
        let byte_index = self.input.chars().take(self.cursor_position).map(|c| c.len_utf8()).sum();
        self.input.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let byte_index: usize = self.input.chars().take(self.cursor_position - 1).map(|c| c.len_utf8()).sum();
            self.input.remove(byte_index);
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn submit_add(&mut self) {
        if self.input.trim().is_empty() {
            self.exit_input_mode();
            return;
        }

        let args: Vec<String> = self.input.split_whitespace().map(|s| s.to_string()).collect();
        let added = parse_add(&args).and_then(|request| {
            self.store.add(
                &request.title,
                request.interval_value,
                request.interval_unit,
                request.color,
            )
        });

        match added {
            Ok(task) => {
                self.status = Some(format!("Added: {} (every {})", task.title, task.interval_label()));
                let pos = self.tasks().iter().position(|t| t.id == task.id);
                self.state.select(pos);
            }
            // Leave the input in place so it can be corrected.
            Err(e) => {
                self.status = Some(e.to_string());
                return;
            }
        }

        self.input.clear();
        self.cursor_position = 0;
        self.exit_input_mode();
    }

    /// Runs one due-check and refreshes the clock used for countdowns.
    pub fn check_reminders(&mut self) {
        self.now = Utc::now();
        let report = self.scheduler.tick_at(&mut self.store, self.now);
        self.clamp_selection();
        if !report.is_empty() && self.scheduler.gateway().permission_state() != Permission::Granted {
            self.status = Some(format!(
                "{} reminder(s) due; press n to enable notifications",
                report.fired.len()
            ));
        }
    }

    pub fn refresh_clock(&mut self) {
        self.now = Utc::now();
    }

    /// Asks for notification permission and remembers the answer.
    pub fn request_notifications(&mut self) {
        let state = self.scheduler.gateway_mut().enable();
        self.status = Some(format!("Notifications: {state}"));

        if let Err(e) = self.config.remember_permission(state, &self.config_path) {
            warn!("cannot save config: {e:#}");
            self.status = Some(format!("Notifications: {state} (not saved)"));
        }
    }

    pub fn banner(&self) -> Option<Notification> {
        self.scheduler.gateway().banner()
    }

    pub fn dismiss_banner(&mut self) {
        self.scheduler.gateway().dismiss();
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use remindism_core::{IntervalUnit, MemoryTaskRepository, TaskColor};

    fn quiet_config() -> Config {
        Config {
            bell: false,
            ..Config::default()
        }
    }

    fn app_on(repo: MemoryTaskRepository, titles: &[&str]) -> App<MemoryTaskRepository> {
        let mut store = TaskStore::open(repo);
        for title in titles {
            store
                .add(title, 5, IntervalUnit::Minutes, TaskColor::Blue)
                .unwrap();
        }
        // Only the notification tests write config, and they pass their own path.
        App::new(store, quiet_config(), PathBuf::from("unused-config.toml"))
    }

    fn app_with(titles: &[&str]) -> App<MemoryTaskRepository> {
        app_on(MemoryTaskRepository::new(), titles)
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app_with(&["a", "b"]);
        assert_eq!(app.state.selected(), Some(0));
        app.previous();
        assert_eq!(app.state.selected(), Some(1));
        app.next();
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_submit_add_parses_options() {
        let mut app = app_with(&[]);
        app.enter_add_mode();
        for c in "Stretch every:2h color:pink".chars() {
            app.input_char(c);
        }
        app.submit_add();

        let task = app.selected_task().unwrap();
        assert_eq!(task.title, "Stretch");
        assert_eq!(task.interval_value, 2);
        assert_eq!(task.interval_unit, IntervalUnit::Hours);
        assert_eq!(task.color, TaskColor::Pink);
        assert!(matches!(app.input_mode, InputMode::Normal));
    }

    #[test]
    fn test_submit_add_keeps_bad_input() {
        let mut app = app_with(&[]);
        app.enter_add_mode();
        for c in "Tea every:0m".chars() {
            app.input_char(c);
        }
        app.submit_add();

        assert!(app.store.is_empty());
        assert_eq!(app.input, "Tea every:0m");
        assert!(matches!(app.input_mode, InputMode::Adding));
        assert!(app.status.is_some());
    }

    #[test]
    fn test_delete_last_moves_selection_up() {
        let mut app = app_with(&["a", "b"]);
        app.state.select(Some(1));
        app.delete_selected();
        assert_eq!(app.state.selected(), Some(0));
        app.delete_selected();
        assert_eq!(app.state.selected(), None);
    }

    #[test]
    fn test_toggle_selected_pauses() {
        let mut app = app_with(&["a"]);
        app.toggle_selected();
        assert!(!app.tasks()[0].active);
        assert_eq!(app.status.as_deref(), Some("Paused: a"));
    }

    #[test]
    fn test_selection_follows_tasks_removed_elsewhere() {
        let repo = MemoryTaskRepository::new();
        let mut app = app_on(repo.clone(), &["a", "b"]);
        app.state.select(Some(1));

        let mut other = TaskStore::open(repo);
        let last = other.list()[1].id;
        other.delete(&last).unwrap();

        app.check_reminders();
        assert_eq!(app.tasks().len(), 1);
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_request_notifications_grants_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config {
            notification_permission: Permission::Denied,
            ..quiet_config()
        };
        let mut app = App::new(TaskStore::open(MemoryTaskRepository::new()), config, path.clone());

        app.request_notifications();

        assert_eq!(app.scheduler.gateway().permission_state(), Permission::Granted);
        assert_eq!(app.banner(), Some(Notification::permission_confirmed()));
        assert_eq!(app.status.as_deref(), Some("Notifications: granted"));
        assert_eq!(Config::load(&path).unwrap().notification_permission, Permission::Granted);
    }

    #[test]
    fn test_request_notifications_reports_unsaved_config() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in place of the file makes the write fail.
        let path = dir.path().to_path_buf();
        let mut app = App::new(TaskStore::open(MemoryTaskRepository::new()), quiet_config(), path);

        app.request_notifications();

        assert_eq!(app.scheduler.gateway().permission_state(), Permission::Granted);
        assert_eq!(app.status.as_deref(), Some("Notifications: granted (not saved)"));
    }

    #[test]
    fn test_due_task_shows_banner_when_granted() {
        let mut app = app_with(&["Water plants"]);
        app.scheduler.gateway_mut().set_permission(Permission::Granted);
        let id = app.tasks()[0].id;
        app.store
            .apply_schedule(&[(id, Utc::now() - Duration::seconds(1))]);

        app.check_reminders();

        let banner = app.banner().unwrap();
        assert_eq!(banner.title, "Time's up: Water plants");
        assert!(app.tasks()[0].next_notification_at > app.now);
    }
}
