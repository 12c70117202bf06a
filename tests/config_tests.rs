use popup_service::config::{Config, ConfigLoader};
use popup_service::system::StandardFileSystem;
use std::time::Duration;
use tempfile::TempDir;

/// Configuration loading against the real file system

#[cfg(test)]
mod config_file_tests {
    use super::*;

    #[test]
    fn test_missing_config_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("nested/popup-service/config.toml");
        let loader = ConfigLoader::new(StandardFileSystem, config_path.clone());

        assert!(!loader.config_exists());
        let config = loader.load_config().unwrap();

        assert_eq!(config, Config::default());
        assert!(config_path.exists());

        // The written defaults read back identically
        let reloaded = loader.load_config().unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_full_config_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[general]
log_level = "debug"
file_logging = false
json_logs = true
log_retention_days = 14

[settings]
path = "/var/lib/popup/settings.toml"
poll_interval_ms = 250

[notifications]
enabled = true
title = "Break time"
body_prefix = "Reminder"
running_message = "Reminders are on"
"#,
        )
        .unwrap();

        let config = Config::load(config_path.to_str()).unwrap();

        assert_eq!(config.general.log_level, "debug");
        assert!(!config.general.file_logging);
        assert!(config.general.json_logs);
        assert_eq!(config.general.log_retention_days, 14);
        assert_eq!(
            config.settings.resolved_path().unwrap(),
            std::path::PathBuf::from("/var/lib/popup/settings.toml")
        );
        assert_eq!(config.settings.poll_interval(), Some(Duration::from_millis(250)));
        assert_eq!(config.notifications.title, "Break time");
        assert_eq!(config.notifications.body_prefix, "Reminder");
        assert_eq!(config.notifications.running_message, "Reminders are on");
    }

    #[test]
    fn test_zero_poll_interval_disables_watcher() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "[settings]\npoll_interval_ms = 0\n").unwrap();

        let config = Config::load(config_path.to_str()).unwrap();
        assert_eq!(config.settings.poll_interval(), None);
        assert_eq!(config.notifications.body_prefix, "Hello World");
    }

    #[test]
    fn test_invalid_config_reports_path() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "[general\nlog_level = ").unwrap();

        let err = Config::load(config_path.to_str()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse configuration file"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.notifications.title = "Custom".to_string();
        config.settings.poll_interval_ms = 5_000;
        config.save(config_path.to_str()).unwrap();

        let loaded = Config::load(config_path.to_str()).unwrap();
        assert_eq!(loaded, config);
    }
}
