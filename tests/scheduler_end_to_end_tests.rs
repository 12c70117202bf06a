use popup_service::config::NotificationConfig;
use popup_service::settings::{SettingsBridge, TIMER_OPTION_KEY, UpdateChannel};
use popup_service::{MockHost, MockSettingsStore, TestNotificationSender, TimerOption, TimerScheduler};
use std::time::Duration;
use tokio::time::sleep;

mod test_utils;
use test_utils::builders::granted_manager;

/// End-to-end scheduler scenarios driven through the update channel,
/// the way a running service sees them

struct SchedulerFixture {
    scheduler: TimerScheduler<TestNotificationSender, MockHost>,
    sender: TestNotificationSender,
    host: MockHost,
    settings: SettingsBridge<MockSettingsStore>,
    updates: UpdateChannel,
}

impl SchedulerFixture {
    fn with_persisted(label: Option<&str>) -> Self {
        let store = match label {
            Some(label) => MockSettingsStore::with_value(TIMER_OPTION_KEY, label),
            None => MockSettingsStore::new(),
        };
        let (manager, sender) = granted_manager(&NotificationConfig::default());
        let host = MockHost::new();

        Self {
            scheduler: TimerScheduler::new(manager, host.clone()),
            sender,
            host,
            settings: SettingsBridge::new(store),
            updates: UpdateChannel::new(),
        }
    }

    /// Wire the channel to the scheduler the way the service does
    fn listen(&self) -> tokio::task::JoinHandle<()> {
        let mut receiver = self.updates.subscribe();
        let scheduler = self.scheduler.clone();
        tokio::spawn(async move {
            while let Some(option) = receiver.recv().await {
                scheduler.reconfigure(option);
            }
        })
    }
}

#[cfg(test)]
mod reminder_scenarios {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_thirty_second_reminders_then_deactivate() {
        let fixture = SchedulerFixture::with_persisted(Some("30s"));
        let listener = fixture.listen();

        fixture.scheduler.start(&fixture.settings).await;
        assert_eq!(
            fixture.scheduler.snapshot().current_interval,
            Some(Duration::from_secs(30))
        );

        sleep(Duration::from_millis(90_500)).await;
        assert_eq!(
            fixture.sender.sent_bodies(),
            vec!["Hello World 1", "Hello World 2", "Hello World 3"]
        );

        // Only the latest reminder stays on screen
        let visible = fixture.sender.visible_notifications();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].body, "Hello World 3");

        fixture.updates.publish_option(TimerOption::Deactivated);
        sleep(Duration::from_millis(10)).await;

        assert!(!fixture.scheduler.snapshot().enabled);
        assert_eq!(fixture.host.get_stop_request_count(), 1);

        sleep(Duration::from_secs(600)).await;
        assert_eq!(fixture.sender.sent_bodies().len(), 3);

        listener.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_persisted_value_waits_for_update() {
        let fixture = SchedulerFixture::with_persisted(None);
        let listener = fixture.listen();

        fixture.scheduler.start(&fixture.settings).await;
        sleep(Duration::from_secs(120)).await;
        assert!(fixture.sender.sent_bodies().is_empty());
        assert_eq!(fixture.host.get_stop_request_count(), 0);

        fixture.updates.publish(popup_service::settings::TimerUpdate::new("10s"));
        sleep(Duration::from_millis(20_500)).await;
        assert_eq!(
            fixture.sender.sent_bodies(),
            vec!["Hello World 1", "Hello World 2"]
        );

        listener.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_intervals_restarts_count() {
        let fixture = SchedulerFixture::with_persisted(Some("10s"));
        let listener = fixture.listen();

        fixture.scheduler.start(&fixture.settings).await;
        sleep(Duration::from_millis(25_000)).await;
        assert_eq!(fixture.sender.sent_bodies().len(), 2);

        fixture.updates.publish_option(TimerOption::SixtySeconds);
        sleep(Duration::from_millis(59_000)).await;
        // The old 10s cadence is gone
        assert_eq!(fixture.sender.sent_bodies().len(), 2);

        sleep(Duration::from_millis(2_000)).await;
        assert_eq!(
            fixture.sender.sent_bodies().last().map(String::as_str),
            Some("Hello World 1")
        );
        assert_eq!(fixture.scheduler.snapshot().tick_count, 1);

        listener.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_update_label_deactivates() {
        let fixture = SchedulerFixture::with_persisted(Some("30 min"));
        let listener = fixture.listen();

        fixture.scheduler.start(&fixture.settings).await;
        assert!(fixture.scheduler.is_armed());

        fixture.updates.publish(popup_service::settings::TimerUpdate::new("every now and then"));
        sleep(Duration::from_millis(10)).await;

        assert!(!fixture.scheduler.is_armed());
        assert_eq!(fixture.host.get_stop_request_count(), 1);

        listener.abort();
    }
}
