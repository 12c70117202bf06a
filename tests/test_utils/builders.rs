//! Test utility builders for configs, settings files and wired-up services
//!
//! Individual helpers may not be used by all tests, so dead code warnings are suppressed.

#![allow(dead_code)]

use popup_service::config::{Config, NotificationConfig};
use popup_service::notifications::NotificationManager;
use popup_service::settings::TIMER_OPTION_KEY;
use popup_service::{MockFileSystem, PopupService, TestNotificationSender};
use std::path::PathBuf;

pub const SETTINGS_PATH: &str = "/test/settings.toml";

/// Builder for test `Config` instances pointing at an in-memory settings file
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        let mut config = Config::default();
        config.settings.path = Some(PathBuf::from(SETTINGS_PATH));
        config.general.file_logging = false;
        Self { config }
    }

    pub fn poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.config.settings.poll_interval_ms = poll_interval_ms;
        self
    }

    pub fn notifications_enabled(mut self, enabled: bool) -> Self {
        self.config.notifications.enabled = enabled;
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.config.notifications.title = title.to_string();
        self
    }

    pub fn body_prefix(mut self, body_prefix: &str) -> Self {
        self.config.notifications.body_prefix = body_prefix.to_string();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

/// Settings file content persisting the given label
pub fn settings_file(label: &str) -> String {
    format!("{} = \"{}\"\n", TIMER_OPTION_KEY, label)
}

/// Notification manager over a recording sender, permission already granted
pub fn granted_manager(config: &NotificationConfig) -> (NotificationManager<TestNotificationSender>, TestNotificationSender) {
    let sender = TestNotificationSender::new();
    let manager = NotificationManager::new(config, sender.clone());
    manager.request_permission();
    (manager, sender)
}

/// Everything a service-level test needs to drive and observe a `PopupService`
pub struct ServiceFixture {
    pub file_system: MockFileSystem,
    pub sender: TestNotificationSender,
    pub config: Config,
}

impl ServiceFixture {
    pub fn new(config: Config) -> Self {
        Self {
            file_system: MockFileSystem::new(),
            sender: TestNotificationSender::new(),
            config,
        }
    }

    pub fn with_persisted(self, label: &str) -> Self {
        self.file_system.add_file(SETTINGS_PATH, settings_file(label));
        self
    }

    pub fn persist(&self, label: &str) {
        self.file_system.add_file(SETTINGS_PATH, settings_file(label));
    }

    pub fn service(&self) -> PopupService<MockFileSystem, TestNotificationSender> {
        PopupService::new(self.config.clone(), self.file_system.clone(), self.sender.clone())
            .expect("service should build from test config")
    }

    /// Bodies of the reminders sent so far, without the startup notice
    pub fn reminder_bodies(&self) -> Vec<String> {
        self.sender
            .sent_bodies()
            .into_iter()
            .filter(|body| body != &self.config.notifications.running_message)
            .collect()
    }
}
