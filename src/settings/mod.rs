pub mod bridge;
pub mod channel;
pub mod store;
pub mod watcher;

pub use bridge::{SettingsBridge, TIMER_OPTION_KEY};
pub use channel::{TimerUpdate, UPDATE_TIMER_ACTION, UpdateChannel, UpdateReceiver};
pub use store::FileSettingsStore;
pub use watcher::SettingsWatcher;
