pub mod config;
pub mod logging;
pub mod notifications;
pub mod service;
pub mod settings;
pub mod system;
pub mod timer;

pub use config::{Config, ConfigLoader};
pub use notifications::{DesktopNotificationSender, NotificationManager, NotificationSender, PopupNotification};
pub use service::{PopupService, ServiceHandle};
pub use settings::{SettingsBridge, UpdateChannel};
pub use timer::{SchedulerState, TickOutcome, TimerOption, TimerScheduler};

#[cfg(any(test, feature = "test-mocks"))]
pub use notifications::TestNotificationSender;
#[cfg(any(test, feature = "test-mocks"))]
pub use system::{MockFileSystem, MockHost, MockSettingsStore};
