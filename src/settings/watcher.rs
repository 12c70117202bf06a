use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::bridge::SettingsBridge;
use super::channel::UpdateChannel;
use crate::system::SettingsStore;
use crate::timer::TimerOption;

/// Polls the settings store and publishes an update whenever the stored option changes
///
/// This is how an out-of-process writer (the CLI) reaches a running scheduler.
pub struct SettingsWatcher<S: SettingsStore> {
    settings: SettingsBridge<S>,
    updates: UpdateChannel,
    poll_interval: Duration,
}

impl<S: SettingsStore> SettingsWatcher<S> {
    pub fn new(settings: SettingsBridge<S>, updates: UpdateChannel, poll_interval: Duration) -> Self {
        Self {
            settings,
            updates,
            poll_interval,
        }
    }

    /// Start polling; changes are measured against `baseline`
    pub fn spawn(self, baseline: TimerOption) -> JoinHandle<()> {
        tokio::spawn(self.run(baseline))
    }

    async fn run(self, baseline: TimerOption) {
        info!(
            "Watching settings every {}ms (baseline {})",
            self.poll_interval.as_millis(),
            baseline
        );

        let mut last_seen = baseline;
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            // A failed read says nothing about the user's choice; keep the last value
            let current = match self.settings.try_load().await {
                Ok(option) => option,
                Err(e) => {
                    warn!("Settings poll failed: {:#}", e);
                    continue;
                }
            };

            if current == last_seen {
                continue;
            }

            info!("Persisted timer option changed: {} -> {}", last_seen, current);
            let receivers = self.updates.publish_option(current);
            if receivers == 0 {
                debug!("No scheduler listening for timer updates");
            }
            last_seen = current;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TIMER_OPTION_KEY;
    use crate::system::MockSettingsStore;

    fn watcher_for(
        store: &MockSettingsStore,
        updates: &UpdateChannel,
    ) -> SettingsWatcher<MockSettingsStore> {
        SettingsWatcher::new(
            SettingsBridge::new(store.clone()),
            updates.clone(),
            Duration::from_secs(1),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_publishes_changed_option() {
        let store = MockSettingsStore::with_value(TIMER_OPTION_KEY, "30s");
        let updates = UpdateChannel::new();
        let mut receiver = updates.subscribe();
        let handle = watcher_for(&store, &updates).spawn(TimerOption::ThirtySeconds);

        store.set(TIMER_OPTION_KEY, "10s");

        let received = tokio::time::timeout(Duration::from_secs(5), receiver.recv()).await;
        assert_eq!(received.unwrap(), Some(TimerOption::TenSeconds));
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_option_is_not_republished() {
        let store = MockSettingsStore::with_value(TIMER_OPTION_KEY, "30s");
        let updates = UpdateChannel::new();
        let mut receiver = updates.subscribe();
        let handle = watcher_for(&store, &updates).spawn(TimerOption::ThirtySeconds);

        let received = tokio::time::timeout(Duration::from_secs(5), receiver.recv()).await;
        assert!(received.is_err(), "unexpected update: {received:?}");
        assert!(store.get_read_count() >= 3);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_failure_is_not_a_deactivation() {
        let store = MockSettingsStore::with_value(TIMER_OPTION_KEY, "30s");
        store.set_read_failure(true);
        let updates = UpdateChannel::new();
        let mut receiver = updates.subscribe();
        let handle = watcher_for(&store, &updates).spawn(TimerOption::ThirtySeconds);

        let received = tokio::time::timeout(Duration::from_secs(5), receiver.recv()).await;
        assert!(received.is_err(), "unexpected update: {received:?}");
        handle.abort();
    }
}
