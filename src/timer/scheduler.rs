use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::option::TimerOption;
use super::state::SchedulerState;
use crate::notifications::{NotificationManager, NotificationSender};
use crate::settings::SettingsBridge;
use crate::system::{HostControl, SettingsStore};

/// What a single timer firing did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Emitted the reminder carrying this tick count
    Emitted(u64),
    /// Permission denied; nothing shown, timer still running
    Skipped,
    /// Fired for a timer that has since been cancelled
    Stale,
}

struct Runtime {
    state: SchedulerState,
    pending: Option<JoinHandle<()>>,
}

struct Shared<T: NotificationSender, H: HostControl> {
    runtime: Mutex<Runtime>,
    notifications: NotificationManager<T>,
    host: H,
    runtime_handle: Handle,
}

/// Owns the reminder interval and at most one armed repeating timer
///
/// The timer is cooperative: each tick is a one-shot sleep task that re-arms
/// the next one. Every armed task carries the state generation it was armed
/// under, and all state transitions happen under one mutex, so a tick racing
/// a cancellation observes the bumped generation and does nothing.
pub struct TimerScheduler<T: NotificationSender, H: HostControl> {
    shared: Arc<Shared<T, H>>,
}

impl<T: NotificationSender, H: HostControl> Clone for TimerScheduler<T, H> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: NotificationSender + 'static, H: HostControl> TimerScheduler<T, H> {
    /// Build on the runtime the caller is running in
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime; use
    /// [`with_runtime`](Self::with_runtime) from plain threads.
    pub fn new(notifications: NotificationManager<T>, host: H) -> Self {
        Self::with_runtime(notifications, host, Handle::current())
    }

    /// Build with an explicit runtime for the timer tasks
    ///
    /// `reconfigure`, `on_tick` and `stop` may then be called from any thread.
    pub fn with_runtime(notifications: NotificationManager<T>, host: H, runtime_handle: Handle) -> Self {
        Self {
            shared: Arc::new(Shared {
                runtime: Mutex::new(Runtime {
                    state: SchedulerState::new(),
                    pending: None,
                }),
                notifications,
                host,
                runtime_handle,
            }),
        }
    }

    /// Arm from the persisted interval
    ///
    /// Only the settings read suspends. Calling this while armed re-reads
    /// settings and changes nothing; a `reconfigure` landing during the read
    /// wins over the value the read returns.
    pub async fn start<S: SettingsStore>(&self, settings: &SettingsBridge<S>) {
        let generation_before = self.lock().state.generation;
        let option = settings.load().await;

        let mut runtime = self.lock();
        if runtime.state.enabled {
            debug!("Scheduler already armed, start is a no-op");
            return;
        }
        if runtime.state.generation != generation_before {
            debug!("Scheduler reconfigured while settings were loading, ignoring {}", option);
            return;
        }

        match option.duration() {
            Some(period) => {
                info!("Starting reminders every {} ({}ms)", option, period.as_millis());
                self.arm(&mut runtime, period);
            }
            None => {
                info!("Persisted timer option is {}, scheduler stays idle", option);
            }
        }
    }

    /// Apply an interval change delivered on the update channel
    ///
    /// A disabled option cancels the timer and asks the host to stop itself.
    pub fn reconfigure(&self, option: TimerOption) {
        let mut runtime = self.lock();

        match option.duration() {
            Some(period) => {
                info!("Reconfiguring reminders to every {} ({}ms)", option, period.as_millis());
                self.arm(&mut runtime, period);
            }
            None => {
                info!("Timer option {} disables reminders, stopping", option);
                Self::cancel(&mut runtime);
                runtime.state.disarm();
                drop(runtime);
                self.shared.host.request_stop();
            }
        }
    }

    /// Handle one firing of the timer armed under `generation`
    ///
    /// The reminder is emitted while the state lock is held, so `stop` and
    /// `reconfigure` wait for an in-flight emission and no reminder appears
    /// after they return. A desktop sender blocks for at most one D-Bus call
    /// (the bus default of about 25s when the server hangs).
    pub fn on_tick(&self, generation: u64) -> TickOutcome {
        let mut runtime = self.lock();

        let period = match runtime.state.current_interval {
            Some(period) if runtime.state.enabled && runtime.state.generation == generation => {
                period
            }
            _ => {
                debug!("Ignoring stale tick from generation {}", generation);
                return TickOutcome::Stale;
            }
        };

        let outcome = if self.shared.notifications.is_permitted() {
            runtime.state.tick_count += 1;
            let tick_count = runtime.state.tick_count;
            let message = self.shared.notifications.tick_message(tick_count);
            if let Err(e) = self.shared.notifications.emit(&message) {
                warn!("Failed to emit reminder {}: {:#}", tick_count, e);
            }
            TickOutcome::Emitted(tick_count)
        } else {
            debug!("Notification permission denied, skipping tick");
            TickOutcome::Skipped
        };

        runtime.pending = Some(self.schedule_tick(generation, period));
        outcome
    }

    /// Cancel the timer; no tick is delivered after this returns
    pub fn stop(&self) {
        let mut runtime = self.lock();
        Self::cancel(&mut runtime);
        runtime.state.disarm();
        info!("Scheduler stopped");
    }

    pub fn snapshot(&self) -> SchedulerState {
        self.lock().state.clone()
    }

    pub fn is_armed(&self) -> bool {
        self.lock().state.is_armed()
    }

    pub fn notifications(&self) -> &NotificationManager<T> {
        &self.shared.notifications
    }

    fn lock(&self) -> MutexGuard<'_, Runtime> {
        self.shared
            .runtime
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn arm(&self, runtime: &mut Runtime, period: Duration) {
        Self::cancel(runtime);
        runtime.state.arm(period);
        let generation = runtime.state.generation;
        runtime.pending = Some(self.schedule_tick(generation, period));
    }

    fn cancel(runtime: &mut Runtime) {
        if let Some(pending) = runtime.pending.take() {
            pending.abort();
        }
        runtime.state.invalidate();
    }

    fn schedule_tick(&self, generation: u64, period: Duration) -> JoinHandle<()> {
        let scheduler = self.clone();
        self.shared.runtime_handle.spawn(async move {
            tokio::time::sleep(period).await;
            scheduler.on_tick(generation);
        })
    }
}
