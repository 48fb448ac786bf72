pub mod terminal;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::task::Task;

pub use terminal::TerminalGateway;

/// Icon path attached to every notification.
pub const APP_ICON: &str = "/icon-192x192.png";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    #[default]
    Undetermined,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Permission::Granted => "granted",
            Permission::Denied => "denied",
            Permission::Undetermined => "undetermined",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Notifications sharing a tag replace each other.
    pub tag: String,
    pub icon: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            tag: tag.into(),
            icon: APP_ICON.to_string(),
        }
    }

    /// The reminder fired when `task` comes due.
    pub fn reminder(task: &Task) -> Self {
        let verb = if task.interval_value == 1 { "has" } else { "have" };
        Self::new(
            format!("Time's up: {}", task.title),
            format!("{} {verb} passed.", task.interval_label()),
            task.id.to_string(),
        )
    }

    pub fn permission_confirmed() -> Self {
        Self::new(
            "Notifications enabled",
            "This is how your reminders will appear.",
            "permission",
        )
    }
}

/// Platform capability for showing notifications.
///
/// Implementors supply `prompt` and `show`; callers use `request_permission`
/// and `deliver`, which enforce the permission rules.
pub trait NotificationGateway {
    fn permission_state(&self) -> Permission;

    /// Asks the platform for permission and returns the resulting state.
    fn prompt(&mut self) -> Permission;

    /// Puts a notification on screen unconditionally.
    fn show(&self, notification: &Notification);

    /// Records a choice the user made outside `prompt`.
    fn set_permission(&mut self, permission: Permission);

    fn request_permission(&mut self) -> Permission {
        let state = self.prompt();
        if state == Permission::Granted {
            self.show(&Notification::permission_confirmed());
        }
        state
    }

    /// An explicit opt-in from the user. Clears an earlier refusal, then asks.
    fn enable(&mut self) -> Permission {
        if self.permission_state() == Permission::Denied {
            self.set_permission(Permission::Undetermined);
        }
        self.request_permission()
    }

    fn disable(&mut self) -> Permission {
        self.set_permission(Permission::Denied);
        Permission::Denied
    }

        /// Fire and forget. Does nothing without permission.
    fn deliver(&self, notification: &Notification) {
        if self.permission_state() == Permission::Granted {
            self.show(notification);
        }
    }
}
