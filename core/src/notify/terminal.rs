use std::cell::RefCell;
use std::io::{self, Stdout, Write};

use tracing::debug;

use crate::notify::{Notification, NotificationGateway, Permission};

const BELL: &str = "\x07";

/// Prints notifications to a terminal stream.
///
/// There is no platform prompt in a terminal: asking for permission grants
/// it unless the user has already turned notifications off.
pub struct TerminalGateway<W: Write> {
    permission: Permission,
    bell: bool,
    out: RefCell<W>,
}

impl TerminalGateway<Stdout> {
    pub fn stdout(permission: Permission, bell: bool) -> Self {
        Self::new(io::stdout(), permission, bell)
    }
}

impl<W: Write> TerminalGateway<W> {
    pub fn new(out: W, permission: Permission, bell: bool) -> Self {
        Self {
            permission,
            bell,
            out: RefCell::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn write(&self, notification: &Notification) -> io::Result<()> {
        let mut out = self.out.borrow_mut();
        if self.bell {
            out.write_all(BELL.as_bytes())?;
        }
        writeln!(out, "\r\n* {}", notification.title)?;
        writeln!(out, "  {}", notification.body)?;
        out.flush()
    }
}

impl<W: Write> NotificationGateway for TerminalGateway<W> {
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
        if let Err(e) = self.write(notification) {
            debug!(tag = %notification.tag, "notification not written: {e}");
        }
    }

    fn set_permission(&mut self, permission: Permission) {
        self.permission = permission;
    }
}
