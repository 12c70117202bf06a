use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::timer::TimerOption;

/// Name of the process-local channel carrying interval changes
pub const UPDATE_TIMER_ACTION: &str = "popup_service.UPDATE_TIMER";

const CHANNEL_CAPACITY: usize = 16;

/// Inbound interval-change message with its single payload field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerUpdate {
    pub timer_option: Option<String>,
}

impl TimerUpdate {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            timer_option: Some(label.into()),
        }
    }

    pub fn from_option(option: TimerOption) -> Self {
        Self::new(option.label())
    }

    /// Missing or unrecognized payloads decode to `Deactivated`
    pub fn decode(&self) -> TimerOption {
        match self.timer_option.as_deref() {
            Some(label) => {
                if TimerOption::parse(label).is_none() {
                    warn!("Unrecognized timer option {:?}, treating as Deactivated", label);
                }
                TimerOption::from_label(label)
            }
            None => {
                debug!("Timer update without payload, treating as Deactivated");
                TimerOption::Deactivated
            }
        }
    }
}

/// Fire-and-forget broadcast channel for interval changes
#[derive(Debug, Clone)]
pub struct UpdateChannel {
    name: &'static str,
    sender: broadcast::Sender<TimerUpdate>,
}

impl UpdateChannel {
    pub fn new() -> Self {
        Self::named(UPDATE_TIMER_ACTION)
    }

    pub fn named(name: &'static str) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { name, sender }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Register a receiver; only messages published afterwards are delivered
    pub fn subscribe(&self) -> UpdateReceiver {
        UpdateReceiver {
            name: self.name,
            receiver: self.sender.subscribe(),
        }
    }

    /// Publish without acknowledgement; returns how many receivers got it
    pub fn publish(&self, update: TimerUpdate) -> usize {
        match self.sender.send(update) {
            Ok(receivers) => {
                debug!("Published timer update on {} to {} receiver(s)", self.name, receivers);
                receivers
            }
            Err(broadcast::error::SendError(update)) => {
                debug!("No receiver registered on {}, dropping {:?}", self.name, update);
                0
            }
        }
    }

    pub fn publish_option(&self, option: TimerOption) -> usize {
        self.publish(TimerUpdate::from_option(option))
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for UpdateChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Registered end of an [`UpdateChannel`]; dropping it unregisters
pub struct UpdateReceiver {
    name: &'static str,
    receiver: broadcast::Receiver<TimerUpdate>,
}

impl UpdateReceiver {
    /// Next decoded option, `None` once every sender is gone
    pub async fn recv(&mut self) -> Option<TimerOption> {
        loop {
            match self.receiver.recv().await {
                Ok(update) => return Some(update.decode()),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Receiver on {} lagged, {} update(s) dropped", self.name, skipped);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Channel {} closed", self.name);
                    return None;
                }
            }
        }
    }
}
