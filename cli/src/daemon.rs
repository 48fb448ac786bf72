use std::io::{self, Write};

use anyhow::Result;
use chrono::{DateTime, Utc};
use remindism_core::{
    countdown, run_reminders, Cadence, Config, NotificationGateway, Permission, ReminderScheduler,
    Task, TaskRepository, TaskStore, TerminalGateway,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::listing::fit_width;

/// Runs reminders in the foreground until Ctrl-C.
pub fn run<R: TaskRepository>(store: TaskStore<R>, config: &Config) -> Result<()> {
    let gateway = TerminalGateway::stdout(config.notification_permission, config.bell);
    if gateway.permission_state() != Permission::Granted {
        println!(
            "Notifications are {}; reminders will be rescheduled silently. Run `remindism notifications enable` to turn them on.",
            gateway.permission_state()
        );
    }
    let scheduler = ReminderScheduler::new(gateway);
    let cadence = Cadence::from(config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("cannot listen for Ctrl-C: {e}");
                return;
            }
            on_interrupt.cancel();
        });

        println!("Watching {} tasks. Press Ctrl-C to stop.", store.len());
        run_reminders(store, &scheduler, cadence, cancel, draw_status).await;
    });

    println!();
    Ok(())
}

/// Rewrites the status line with the soonest running task.
fn draw_status(tasks: &[Task], now: DateTime<Utc>) {
    if let Err(e) = write_status(&mut io::stdout(), &status_line(tasks, now)) {
        debug!("status line not written: {e}");
    }
}

fn write_status(out: &mut impl Write, line: &str) -> io::Result<()> {
    write!(out, "\r\x1b[2K{line}")?;
    out.flush()
}

fn status_line(tasks: &[Task], now: DateTime<Utc>) -> String {
    let running = tasks.iter().filter(|t| t.is_running()).count();
    match tasks
        .iter()
        .filter(|t| t.is_running())
        .min_by_key(|t| t.next_notification_at)
    {
        Some(next) => format!(
            "{running} running | next: {} ({})",
            fit_width(&next.title, 40),
            countdown(next, now)
        ),
        None => "nothing running".to_string(),
    }
}
