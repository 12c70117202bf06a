use std::time::Duration;

/// Runtime state of the reminder scheduler
///
/// Owned exclusively by [`TimerScheduler`](super::TimerScheduler). Nothing
/// here survives a restart; the persisted interval lives in the settings store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerState {
    /// Repeat period of the armed timer, `None` while disabled
    pub current_interval: Option<Duration>,
    pub enabled: bool,
    /// Notifications emitted since the timer was last (re)armed
    pub tick_count: u64,
    /// Bumped on every cancellation; ticks stamped with an older value are stale
    pub generation: u64,
}

impl SchedulerState {
    /// Create an idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a timer is armed
    pub fn is_armed(&self) -> bool {
        self.enabled && self.current_interval.is_some()
    }

    pub(crate) fn arm(&mut self, period: Duration) {
        self.current_interval = Some(period);
        self.enabled = true;
        self.tick_count = 0;
    }

    pub(crate) fn disarm(&mut self) {
        self.current_interval = None;
        self.enabled = false;
    }

    pub(crate) fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}
