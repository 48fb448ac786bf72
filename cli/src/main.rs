mod daemon;
mod listing;
mod logging;
mod tui;

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use remindism_core::config::default_config_path;
use remindism_core::{
    parse_add, Config, FileTaskRepository, IdLookup, NotificationGateway, Permission, TaskRepository,
    TaskStore, TerminalGateway,
};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "remindism")]
#[command(about = "Recurring reminders for the terminal", long_about = None)]
struct Cli {
    /// Directory holding tasks.json (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Add a recurring task (usage: add Drink water every:30m color:green)
    Add {
        /// Title words plus optional every:<N>[m|h|d] and color:<name>
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        args: Vec<String>,
    },
    /// List all tasks by next reminder
    List,
    /// Pause a running task or resume a paused one
    Toggle {
        /// Task ID or a unique prefix of it
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID or a unique prefix of it
        id: String,
    },
    /// Watch tasks and deliver reminders until Ctrl-C
    Run,
    /// Show or change notification permission
    Notifications {
        #[command(subcommand)]
        action: Option<NotifyAction>,
    },
    /// Open the Terminal User Interface
    Tui,
}

#[derive(clap::Subcommand)]
enum NotifyAction {
    /// Print the current permission state
    Status,
    /// Ask for permission to show reminders
    Enable,
    /// Stop showing reminders
    Disable,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let mut config = Config::load(&config_path)?;
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => config.data_dir()?,
    };

    let is_tui = matches!(cli.command, None | Some(Commands::Tui));
    let repo = FileTaskRepository::new(Some(data_dir.clone()))?;
    let _log_guard = if is_tui {
        Some(logging::init_file(&data_dir))
    } else {
        logging::init_stderr();
        None
    };

    let mut store = TaskStore::open(repo);

    match cli.command {
        Some(Commands::Add { args }) => {
            let request = parse_add(&args)?;
            let task = store.add(
                &request.title,
                request.interval_value,
                request.interval_unit,
                request.color,
            )?;
            println!("Task added: {} (ID: {})", task.title, task.short_id());
            println!("  Every: {}", task.interval_label());
            println!("  Color: {}", task.color);
            println!("  Next: {}", listing::format_local(task.next_notification_at));
        }
        Some(Commands::List) => {
            listing::print_tasks(store.list(), Utc::now());
        }
        Some(Commands::Toggle { id }) => match resolve_id(&store, &id) {
            Ok(id) => {
                if let Some(task) = store.toggle(&id) {
                    if task.active {
                        println!(
                            "Resumed: {} (next at {})",
                            task.title,
                            listing::format_local(task.next_notification_at)
                        );
                    } else {
                        println!("Paused: {}", task.title);
                    }
                }
            }
            Err(message) => println!("{message}"),
        },
        Some(Commands::Delete { id }) => match resolve_id(&store, &id) {
            Ok(id) => {
                if let Some(task) = store.delete(&id) {
                    println!("Deleted: {}", task.title);
                }
            }
            Err(message) => println!("{message}"),
        },
        Some(Commands::Run) => {
            daemon::run(store, &config)?;
        }
        Some(Commands::Notifications { action }) => {
            let mut gateway = TerminalGateway::stdout(config.notification_permission, config.bell);
            let action = action.unwrap_or(NotifyAction::Status);
            let state = notifications(&mut gateway, action, &mut config, &config_path)?;
            println!("Notifications: {}", state);
        }
        Some(Commands::Tui) | None => {
            tui::run(store, config, config_path)?;
        }
    }
    Ok(())
}

/// Looks up a typed id. Unknown or ambiguous ids come back as a message for
/// the user, not as an error.
fn resolve_id<R: TaskRepository>(store: &TaskStore<R>, prefix: &str) -> Result<Uuid, String> {
    match store.find_by_prefix(prefix) {
        IdLookup::Found(id) => Ok(id),
        IdLookup::Missing => Err(format!("No task matches '{}'.", prefix)),
        IdLookup::Ambiguous(ids) => Err(format!(
            "'{}' matches {} tasks; type more of the ID.",
            prefix,
            ids.len()
        )),
    }
}

/// Applies a permission command and remembers the outcome in the config
/// file.
fn notifications<G: NotificationGateway>(
    gateway: &mut G,
    action: NotifyAction,
    config: &mut Config,
    config_path: &Path,
) -> Result<Permission> {
    let state = match action {
        NotifyAction::Status => return Ok(gateway.permission_state()),
        NotifyAction::Enable => gateway.enable(),
        NotifyAction::Disable => gateway.disable(),
    };
    config.remember_permission(state, config_path)?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use remindism_core::{IntervalUnit, MemoryTaskRepository, TaskColor};

    fn quiet_gateway(config: &Config) -> TerminalGateway<Vec<u8>> {
        TerminalGateway::new(Vec::new(), config.notification_permission, false)
    }

    #[test]
    fn test_resolve_id() {
        let mut store = TaskStore::open(MemoryTaskRepository::new());
        let task = store.add("Tea", 5, IntervalUnit::Minutes, TaskColor::Blue).unwrap();

        assert_eq!(resolve_id(&store, &task.short_id()), Ok(task.id));
        assert_eq!(resolve_id(&store, "zz"), Err("No task matches 'zz'.".to_string()));
    }

    #[test]
    fn test_resolve_id_reports_ambiguity() {
        let mut store = TaskStore::open(MemoryTaskRepository::new());
        for i in 0..17 {
            store.add(&format!("Task {i}"), 5, IntervalUnit::Minutes, TaskColor::Blue).unwrap();
        }
        // Seventeen ids over sixteen hex digits: some first digit repeats.
        let shared = (0..16)
            .map(|d| format!("{:x}", d))
            .find(|p| store.list().iter().filter(|t| t.id.to_string().starts_with(p.as_str())).count() > 1)
            .unwrap();

        let message = resolve_id(&store, &shared).unwrap_err();
        assert!(message.contains("type more of the ID"), "{message}");
    }

    #[test]
    fn test_enable_persists_grant() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        let mut gateway = quiet_gateway(&config);

        let state = notifications(&mut gateway, NotifyAction::Enable, &mut config, &path).unwrap();
        assert_eq!(state, Permission::Granted);
        assert_eq!(Config::load(&path).unwrap().notification_permission, Permission::Granted);
        assert!(String::from_utf8(gateway.into_inner()).unwrap().contains("Notifications enabled"));
    }

    #[test]
    fn test_enable_after_disable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        let mut gateway = quiet_gateway(&config);

        notifications(&mut gateway, NotifyAction::Disable, &mut config, &path).unwrap();
        assert_eq!(Config::load(&path).unwrap().notification_permission, Permission::Denied);

        let mut gateway = quiet_gateway(&config);
        let state = notifications(&mut gateway, NotifyAction::Enable, &mut config, &path).unwrap();
        assert_eq!(state, Permission::Granted);
        assert_eq!(Config::load(&path).unwrap().notification_permission, Permission::Granted);
    }

    #[test]
    fn test_status_and_unchanged_state_do_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        let mut gateway = quiet_gateway(&config);

        let state = notifications(&mut gateway, NotifyAction::Status, &mut config, &path).unwrap();
        assert_eq!(state, Permission::Undetermined);
        assert!(!path.exists());

        config.notification_permission = Permission::Denied;
        let mut gateway = quiet_gateway(&config);
        notifications(&mut gateway, NotifyAction::Disable, &mut config, &path).unwrap();
        assert!(!path.exists());
    }
}
