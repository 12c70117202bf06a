use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::loader::ConfigLoader;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub settings: SettingsConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
    pub file_logging: bool,
    pub json_logs: bool,
    pub log_retention_days: u64,
}

/// Where the persisted timer option lives and how often the daemon re-reads it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// 0 disables the settings watcher
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// User-level grant; when false the runtime permission is always denied
    pub enabled: bool,
    pub title: String,
    pub body_prefix: String,
    pub running_message: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            file_logging: true,
            json_logs: false,
            log_retention_days: 7,
        }
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: None,
            poll_interval_ms: 1000,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: "Popup Service".to_string(),
            body_prefix: "Hello World".to_string(),
            running_message: "Service is running".to_string(),
        }
    }
}

impl SettingsConfig {
    /// Settings file path, falling back to the per-user data directory
    pub fn resolved_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Self::default_path(),
        }
    }

    pub fn default_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home_dir.join(".local/share/popup-service/settings.toml"))
    }

    /// Watcher poll period, `None` when watching is switched off
    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_interval_ms > 0).then(|| Duration::from_millis(self.poll_interval_ms))
    }
}

impl Config {
    /// Load from `config_path`, or from the default location when `None`
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let loader = match config_path {
            Some(path) => ConfigLoader::new_production(PathBuf::from(path)),
            None => ConfigLoader::new_with_default_path()?,
        };
        loader.load_config()
    }

    pub fn save(&self, config_path: Option<&str>) -> Result<()> {
        let loader = match config_path {
            Some(path) => ConfigLoader::new_production(PathBuf::from(path)),
            None => ConfigLoader::new_with_default_path()?,
        };
        loader.save_config(self)
    }
}
