use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::system::SettingsStore;
use crate::timer::TimerOption;

/// Settings key holding the selected interval label
pub const TIMER_OPTION_KEY: &str = "timer_option_key";

/// Read path to the persisted interval
///
/// Every failure mode resolves to [`TimerOption::Deactivated`] so a broken
/// store can never leave a timer running.
pub struct SettingsBridge<S: SettingsStore> {
    store: Arc<S>,
}

impl<S: SettingsStore> Clone for SettingsBridge<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: SettingsStore> SettingsBridge<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch the persisted option; the blocking read runs off the executor
    pub async fn load(&self) -> TimerOption {
        match self.try_load().await {
            Ok(option) => option,
            Err(e) => {
                warn!("Failed to read timer option, defaulting to Deactivated: {:#}", e);
                TimerOption::Deactivated
            }
        }
    }

    /// Like [`load`](Self::load) but surfaces store failures instead of failing safe
    pub async fn try_load(&self) -> Result<TimerOption> {
        let store = Arc::clone(&self.store);
        let label = tokio::task::spawn_blocking(move || store.read_value(TIMER_OPTION_KEY))
            .await
            .context("Settings read task failed")??;

        let Some(label) = label else {
            debug!("No persisted timer option, defaulting to Deactivated");
            return Ok(TimerOption::Deactivated);
        };

        match TimerOption::parse(&label) {
            Some(option) => {
                debug!("Persisted timer option: {}", option);
                Ok(option)
            }
            None => {
                warn!(
                    "Persisted timer option {:?} is not recognized, treating as Deactivated",
                    label
                );
                Ok(TimerOption::Deactivated)
            }
        }
    }

    /// Persist a new option
    pub async fn save(&self, option: TimerOption) -> Result<()> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.write_value(TIMER_OPTION_KEY, option.label()))
            .await
            .context("Settings write task failed")??;

        info!("Persisted timer option: {}", option);
        Ok(())
    }
}
