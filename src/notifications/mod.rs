use anyhow::Result;
use notify_rust::Notification;
#[cfg(all(unix, not(target_os = "macos")))]
use notify_rust::Urgency;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

use crate::config::NotificationConfig;

/// Application name reported to the notification server
pub const APP_NAME: &str = "popup-service";

/// Fixed notification identity; every emission replaces the previous one
///
/// This is the crate's own slot key, not a server-side id. Desktop servers
/// assign their own ids, see [`DesktopNotificationSender`].
pub const REMINDER_SLOT: u32 = 1;

/// Action identifier that routes the user back to the application entry point
///
/// On desktop servers the "default" action is a click on the notification
/// body. The service has no window to bring forward, so the click only
/// dismisses the reminder; the daemon does not wait for the invocation.
pub const OPEN_APP_ACTION: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Default,
    High,
}

/// A single user-visible notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupNotification {
    pub slot: u32,
    pub title: String,
    pub body: String,
    pub priority: Priority,
    pub sound: bool,
    pub vibrate: bool,
    pub default_action: &'static str,
}

/// Trait for sending notifications - allows for testing without system calls
pub trait NotificationSender: Send + Sync {
    fn send(&self, notification: &PopupNotification) -> Result<()>;

    /// Ask the platform whether notifications can be shown at all
    fn request_permission(&self) -> bool {
        true
    }
}

/// Server-assigned notification ids, remembered per slot
///
/// Freedesktop ids are global and handed out by the server, so a slot is
/// replaced by passing back the id the server returned for it last time.
#[derive(Debug, Default)]
pub struct ServerIds {
    ids: std::sync::Mutex<std::collections::HashMap<u32, u32>>,
}

impl ServerIds {
    /// Id to replace when showing `slot`, `None` before the first emission
    pub fn replaces_id(&self, slot: u32) -> Option<u32> {
        self.ids
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&slot)
            .copied()
    }

    pub fn record(&self, slot: u32, server_id: u32) {
        self.ids
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(slot, server_id);
    }
}

/// Production notification sender using the desktop notification server
#[derive(Debug, Default)]
pub struct DesktopNotificationSender {
    server_ids: ServerIds,
}

impl DesktopNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationSender for DesktopNotificationSender {
    fn send(&self, notification: &PopupNotification) -> Result<()> {
        send_desktop_notification(notification, &self.server_ids)
    }

    fn request_permission(&self) -> bool {
        desktop_backend_available()
    }
}

/// Test notification sender that records notifications instead of showing them
#[cfg(any(test, feature = "test-mocks"))]
#[derive(Clone)]
pub struct TestNotificationSender {
    state: Arc<std::sync::Mutex<TestSenderState>>,
}

#[cfg(any(test, feature = "test-mocks"))]
struct TestSenderState {
    sent: Vec<PopupNotification>,
    slots: std::collections::BTreeMap<u32, PopupNotification>,
    platform_permission: bool,
    should_fail: bool,
    send_delay: Option<std::time::Duration>,
}

#[cfg(any(test, feature = "test-mocks"))]
impl Default for TestNotificationSender {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-mocks"))]
impl TestNotificationSender {
    pub fn new() -> Self {
        Self {
            state: Arc::new(std::sync::Mutex::new(TestSenderState {
                sent: Vec::new(),
                slots: std::collections::BTreeMap::new(),
                platform_permission: true,
                should_fail: false,
                send_delay: None,
            })),
        }
    }

    /// Every notification handed to the sender, in order
    pub fn get_sent_notifications(&self) -> Vec<PopupNotification> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn sent_bodies(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .sent
            .iter()
            .map(|n| n.body.clone())
            .collect()
    }

    /// Notifications currently on screen, one per slot
    pub fn visible_notifications(&self) -> Vec<PopupNotification> {
        self.state.lock().unwrap().slots.values().cloned().collect()
    }

    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        state.sent.clear();
        state.slots.clear();
    }

    /// Control the answer given to `request_permission`
    pub fn set_platform_permission(&self, granted: bool) {
        self.state.lock().unwrap().platform_permission = granted;
    }

    /// Configure the sender to fail every send
    pub fn set_failure(&self, should_fail: bool) {
        self.state.lock().unwrap().should_fail = should_fail;
    }

    /// Block every send for `delay`, like a slow notification server
    pub fn set_send_delay(&self, delay: std::time::Duration) {
        self.state.lock().unwrap().send_delay = Some(delay);
    }
}

#[cfg(any(test, feature = "test-mocks"))]
impl NotificationSender for TestNotificationSender {
    fn send(&self, notification: &PopupNotification) -> Result<()> {
        debug!(
            "Test notification [{}]: {} - {}",
            notification.slot, notification.title, notification.body
        );
        let send_delay = self.state.lock().unwrap().send_delay;
        if let Some(delay) = send_delay {
            std::thread::sleep(delay);
        }

        let mut state = self.state.lock().unwrap();
        if state.should_fail {
            return Err(anyhow::anyhow!("Mock notification failure"));
        }
        state.sent.push(notification.clone());
        state.slots.insert(notification.slot, notification.clone());
        Ok(())
    }

    fn request_permission(&self) -> bool {
        self.state.lock().unwrap().platform_permission
    }
}

/// Runtime "post notifications" grant shared between the sink and its host
#[derive(Debug, Clone, Default)]
pub struct NotificationPermission {
    granted: Arc<AtomicBool>,
}

impl NotificationPermission {
    pub fn is_granted(&self) -> bool {
        self.granted.load(Ordering::Acquire)
    }

    pub fn set(&self, granted: bool) {
        self.granted.store(granted, Ordering::Release);
    }
}

/// Gates and emits reminder notifications
pub struct NotificationManager<T: NotificationSender = DesktopNotificationSender> {
    enabled: bool,
    title: String,
    body_prefix: String,
    running_message: String,
    permission: NotificationPermission,
    sender: T,
}

impl NotificationManager<DesktopNotificationSender> {
    pub fn desktop(config: &NotificationConfig) -> Self {
        Self::new(config, DesktopNotificationSender::new())
    }
}

impl<T: NotificationSender> NotificationManager<T> {
    /// The permission starts out denied until [`request_permission`](Self::request_permission) runs
    pub fn new(config: &NotificationConfig, sender: T) -> Self {
        Self {
            enabled: config.enabled,
            title: config.title.clone(),
            body_prefix: config.body_prefix.clone(),
            running_message: config.running_message.clone(),
            permission: NotificationPermission::default(),
            sender,
        }
    }

    /// One-shot permission request, performed once at service startup
    pub fn request_permission(&self) -> bool {
        let granted = if !self.enabled {
            info!("Notifications disabled in configuration");
            false
        } else {
            self.sender.request_permission()
        };

        self.permission.set(granted);
        if granted {
            info!("Notification permission granted");
        } else {
            warn!("Permission denied, notifications won't work");
        }
        granted
    }

    /// Shared handle to the permission flag
    pub fn permission(&self) -> NotificationPermission {
        self.permission.clone()
    }

    pub fn is_permitted(&self) -> bool {
        self.permission.is_granted()
    }

    /// Emit a notification into the fixed slot
    ///
    /// Returns `Ok(false)` without touching the sender when permission is denied.
    pub fn emit(&self, body: &str) -> Result<bool> {
        if !self.is_permitted() {
            debug!("Notification permission denied, dropping: {}", body);
            return Ok(false);
        }

        let notification = PopupNotification {
            slot: REMINDER_SLOT,
            title: self.title.clone(),
            body: body.to_string(),
            priority: Priority::High,
            sound: true,
            vibrate: true,
            default_action: OPEN_APP_ACTION,
        };

        debug!("Sending notification: {} - {}", notification.title, body);
        self.sender.send(&notification)?;
        Ok(true)
    }

    /// Body of the reminder for the given tick
    pub fn tick_message(&self, tick_count: u64) -> String {
        format!("{} {}", self.body_prefix, tick_count)
    }

    /// Post the "service is running" notice shown while the service is up
    pub fn announce_running(&self) -> Result<bool> {
        self.emit(&self.running_message)
    }

    pub fn sender(&self) -> &T {
        &self.sender
    }

    /// Test notification (for debugging)
    pub fn test_notification(&self) -> Result<()> {
        info!("Starting notification test...");

        if !self.request_permission() {
            return Err(anyhow::anyhow!(
                "Notification permission denied; check the [notifications] section and that a notification server is running"
            ));
        }

        match self.emit("Notification system is working correctly!") {
            Ok(_) => {
                info!("Test notification sent successfully");
            }
            Err(e) => {
                error!("Failed to send notification: {}", e);
                error!("This might be due to:");
                error!("1. Do Not Disturb mode is enabled");
                error!("2. No notification daemon is running for this session");
                return Err(anyhow::anyhow!("Failed to send notification: {}", e));
            }
        }

        info!("Test notification completed");
        Ok(())
    }
}

fn send_desktop_notification(notification: &PopupNotification, server_ids: &ServerIds) -> Result<()> {
    let mut desktop = Notification::new();
    desktop
        .appname(APP_NAME)
        .summary(&notification.title)
        .body(&notification.body)
        .icon("dialog-information")
        .action(notification.default_action, "Open");

    if notification.sound {
        desktop.sound_name("message-new-instant");
    }

    // Replacement ids and urgency are only understood by freedesktop servers
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        if let Some(server_id) = server_ids.replaces_id(notification.slot) {
            desktop.id(server_id);
        }
        if notification.priority == Priority::High {
            desktop.urgency(Urgency::Critical);
        }
    }

    let handle = desktop
        .show()
        .map_err(|e| anyhow::anyhow!("Failed to show notification: {}", e))?;

    #[cfg(all(unix, not(target_os = "macos")))]
    {
        debug!("Slot {} shown as server notification {}", notification.slot, handle.id());
        server_ids.record(notification.slot, handle.id());
    }
    #[cfg(not(all(unix, not(target_os = "macos"))))]
    {
        let _ = (handle, server_ids);
    }

    Ok(())
}

#[cfg(all(unix, not(target_os = "macos")))]
fn desktop_backend_available() -> bool {
    match notify_rust::get_server_information() {
        Ok(server) => {
            debug!("Notification server: {} {}", server.name, server.version);
            true
        }
        Err(e) => {
            warn!("No notification server reachable: {}", e);
            false
        }
    }
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn desktop_backend_available() -> bool {
    true
}
