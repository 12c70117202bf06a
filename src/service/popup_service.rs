use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::signals::{SignalHandler, SignalType};
use crate::config::Config;
use crate::notifications::{DesktopNotificationSender, NotificationManager, NotificationSender};
use crate::settings::{FileSettingsStore, SettingsBridge, SettingsWatcher, TimerUpdate, UpdateChannel};
use crate::system::{FileSystemInterface, ServiceHost, StandardFileSystem};
use crate::timer::{SchedulerState, TimerScheduler};

/// Background reminder service: the host that drives the scheduler's lifecycle
pub struct PopupService<F: FileSystemInterface + 'static, T: NotificationSender + 'static> {
    config: Config,
    settings: SettingsBridge<FileSettingsStore<F>>,
    updates: UpdateChannel,
    scheduler: TimerScheduler<T, ServiceHost>,
    signal_tx: mpsc::UnboundedSender<SignalType>,
    signal_rx: mpsc::UnboundedReceiver<SignalType>,
}

/// Cloneable handle for talking to a running [`PopupService`]
pub struct ServiceHandle<T: NotificationSender + 'static> {
    updates: UpdateChannel,
    signal_tx: mpsc::UnboundedSender<SignalType>,
    scheduler: TimerScheduler<T, ServiceHost>,
}

impl<T: NotificationSender + 'static> Clone for ServiceHandle<T> {
    fn clone(&self) -> Self {
        Self {
            updates: self.updates.clone(),
            signal_tx: self.signal_tx.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T: NotificationSender + 'static> ServiceHandle<T> {
    /// Deliver an interval change the same way the settings screen does
    pub fn update_timer(&self, label: &str) -> usize {
        self.updates.publish(TimerUpdate::new(label))
    }

    /// Returns false when the service loop has already exited
    pub fn shutdown(&self) -> bool {
        self.send(SignalType::Shutdown)
    }

    pub fn reload(&self) -> bool {
        self.send(SignalType::Reload)
    }

    fn send(&self, message: SignalType) -> bool {
        match self.signal_tx.send(message) {
            Ok(()) => true,
            Err(_) => {
                warn!("Service loop is gone, dropping {:?}", message);
                false
            }
        }
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.snapshot()
    }
}

impl<F: FileSystemInterface + 'static, T: NotificationSender + 'static> PopupService<F, T> {
    pub fn new(config: Config, file_system: F, sender: T) -> Result<Self> {
        let settings_path = config.settings.resolved_path()?;
        info!("Using settings file: {}", settings_path.display());

        let settings = SettingsBridge::new(FileSettingsStore::new(file_system, settings_path));
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let notifications = NotificationManager::new(&config.notifications, sender);
        let scheduler = TimerScheduler::new(notifications, ServiceHost::new(signal_tx.clone()));

        Ok(Self {
            config,
            settings,
            updates: UpdateChannel::new(),
            scheduler,
            signal_tx,
            signal_rx,
        })
    }

    pub fn handle(&self) -> ServiceHandle<T> {
        ServiceHandle {
            updates: self.updates.clone(),
            signal_tx: self.signal_tx.clone(),
            scheduler: self.scheduler.clone(),
        }
    }

    pub fn settings(&self) -> &SettingsBridge<FileSettingsStore<F>> {
        &self.settings
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run with OS signal handling until shutdown or until reminders are deactivated
    pub async fn run_with_signals(self) -> Result<()> {
        let signal_handler = SignalHandler::with_sender(self.signal_tx.clone());
        let signal_task = tokio::spawn(async move {
            if let Err(e) = signal_handler.listen_for_signals().await {
                error!("Signal handler error: {}", e);
            }
        });

        let result = self.run().await;
        signal_task.abort();
        result
    }

    /// Run until a shutdown message or a stop request from the scheduler arrives
    pub async fn run(mut self) -> Result<()> {
        info!("Starting popup service");

        self.scheduler.notifications().request_permission();
        if let Err(e) = self.scheduler.notifications().announce_running() {
            warn!("Failed to post running notification: {:#}", e);
        }

        // Register before anything can publish
        let listener = self.spawn_update_listener();
        let watcher = self.spawn_settings_watcher().await;

        self.scheduler.start(&self.settings).await;
        info!("Popup service started, entering main loop");

        loop {
            match self.signal_rx.recv().await {
                Some(SignalType::Shutdown) => {
                    info!("Shutdown signal received, stopping service");
                    break;
                }
                Some(SignalType::StopRequested) => {
                    info!("Reminders deactivated, stopping service");
                    break;
                }
                Some(SignalType::Reload) => self.reload().await,
                None => {
                    warn!("Signal channel closed");
                    break;
                }
            }
        }

        self.scheduler.stop();
        listener.abort();
        if let Some(watcher) = watcher {
            watcher.abort();
        }

        info!("Service shutdown completed");
        Ok(())
    }

    fn spawn_update_listener(&self) -> JoinHandle<()> {
        let mut receiver = self.updates.subscribe();
        let scheduler = self.scheduler.clone();
        info!("Listening for timer updates on {}", self.updates.name());

        tokio::spawn(async move {
            while let Some(option) = receiver.recv().await {
                scheduler.reconfigure(option);
            }
        })
    }

    async fn spawn_settings_watcher(&self) -> Option<JoinHandle<()>> {
        let Some(poll_interval) = self.config.settings.poll_interval() else {
            info!("Settings watcher disabled");
            return None;
        };

        let baseline = self.settings.load().await;
        let watcher = SettingsWatcher::new(self.settings.clone(), self.updates.clone(), poll_interval);
        Some(watcher.spawn(baseline))
    }

    async fn reload(&self) {
        info!("Reload requested, re-reading persisted timer option");
        match self.settings.try_load().await {
            Ok(option) => {
                self.updates.publish_option(option);
            }
            Err(e) => warn!("Failed to reload timer option, keeping current timer: {:#}", e),
        }
    }
}

impl PopupService<StandardFileSystem, DesktopNotificationSender> {
    pub fn new_production(config: Config) -> Result<Self> {
        Self::new(config, StandardFileSystem, DesktopNotificationSender::new())
    }
}
