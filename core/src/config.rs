use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::notify::Permission;

const APP_DIR_NAME: &str = "remindism";
const CONFIG_FILE_NAME: &str = "config.toml";

/// How often due tasks are checked.
pub const DEFAULT_DUE_CHECK_SECS: u64 = 5;
/// How often countdowns are redrawn.
pub const DEFAULT_COUNTDOWN_SECS: u64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding `tasks.json`. Defaults to `~/.remindism`.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_due_check_secs")]
    pub due_check_secs: u64,
    #[serde(default = "default_countdown_secs")]
    pub countdown_secs: u64,
    #[serde(default)]
    pub notification_permission: Permission,
    /// Ring the terminal bell with each notification.
    #[serde(default = "default_bell")]
    pub bell: bool,
}

fn default_due_check_secs() -> u64 {
    DEFAULT_DUE_CHECK_SECS
}

fn default_countdown_secs() -> u64 {
    DEFAULT_COUNTDOWN_SECS
}

fn default_bell() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            due_check_secs: DEFAULT_DUE_CHECK_SECS,
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            notification_permission: Permission::default(),
            bell: true,
        }
    }
}

impl Config {
    /// Reads `path`, or returns defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Stores a new permission state, writing `path` only when it changed.
    /// Returns whether the file was written.
    pub fn remember_permission(&mut self, state: Permission, path: &Path) -> Result<bool> {
        if state == self.notification_permission {
            return Ok(false);
        }
        self.notification_permission = state;
        self.save(path)?;
        Ok(true)
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }

    // Zero would spin the timers.
    pub fn due_check_period(&self) -> Duration {
        Duration::from_secs(self.due_check_secs.max(1))
    }

    pub fn countdown_period(&self) -> Duration {
        Duration::from_secs(self.countdown_secs.max(1))
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;
    Ok(dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

pub fn default_data_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home_dir.join(".remindism"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.due_check_period(), Duration::from_secs(5));
        assert_eq!(config.countdown_period(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "due_check_secs = 0\nnotification_permission = \"granted\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.notification_permission, Permission::Granted);
        assert_eq!(config.due_check_period(), Duration::from_secs(1));
        assert!(config.bell);
    }

    #[test]
    fn test_remember_permission_writes_only_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remindism").join("config.toml");
        let mut config = Config::default();

        assert!(!config.remember_permission(Permission::Undetermined, &path).unwrap());
        assert!(!path.exists());

        assert!(config.remember_permission(Permission::Granted, &path).unwrap());
        assert_eq!(Config::load(&path).unwrap().notification_permission, Permission::Granted);

        assert!(config.remember_permission(Permission::Denied, &path).unwrap());
        assert_eq!(Config::load(&path).unwrap().notification_permission, Permission::Denied);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is not valid toml {{{").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");
        let config = Config {
            data_dir: Some(dir.path().join("data")),
            notification_permission: Permission::Denied,
            bell: false,
            ..Config::default()
        };

        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
