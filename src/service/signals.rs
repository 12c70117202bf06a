use anyhow::Result;
use signal_hook::consts::signal::*;
use signal_hook_tokio::Signals;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::{info, warn};

/// Control messages delivered to the service loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalType {
    /// SIGTERM/SIGINT: graceful shutdown
    Shutdown,
    /// SIGHUP: re-read the persisted timer option
    Reload,
    /// The scheduler asked its host to stop (reminders deactivated)
    StopRequested,
}

impl SignalType {
    /// Map an OS signal number to the message it produces
    pub fn from_signal(signal: i32) -> Option<Self> {
        match signal {
            SIGTERM | SIGINT => Some(SignalType::Shutdown),
            SIGHUP => Some(SignalType::Reload),
            _ => None,
        }
    }
}

/// Forwards OS signals onto the service's control channel
#[derive(Clone)]
pub struct SignalHandler {
    signal_sender: mpsc::UnboundedSender<SignalType>,
}

impl SignalHandler {
    pub fn with_sender(signal_sender: mpsc::UnboundedSender<SignalType>) -> Self {
        Self { signal_sender }
    }

    /// Listen for SIGTERM, SIGINT and SIGHUP until shutdown or the receiver goes away
    pub async fn listen_for_signals(&self) -> Result<()> {
        let mut signals = Signals::new([SIGTERM, SIGINT, SIGHUP])?;
        let handle = signals.handle();

        info!("Signal handler initialized, listening for SIGTERM, SIGINT, SIGHUP");

        while let Some(signal) = signals.next().await {
            let Some(message) = SignalType::from_signal(signal) else {
                warn!("Received unexpected signal: {}", signal);
                continue;
            };

            info!("Received signal {} ({:?})", signal, message);
            if self.signal_sender.send(message).is_err() {
                warn!("Service loop is gone, no longer forwarding signals");
                break;
            }
            if message == SignalType::Shutdown {
                break;
            }
        }

        handle.close();
        Ok(())
    }
}
