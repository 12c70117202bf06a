use anyhow::Result;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::service::signals::SignalType;
use crate::system::traits::{FileSystemInterface, HostControl};

/// Production implementation of FileSystemInterface using std::fs
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFileSystem;

impl FileSystemInterface for StandardFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        std::fs::write(path, content)
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)
            .map_err(|e| anyhow::anyhow!("Failed to create directory {}: {}", path.display(), e))
    }
}

/// Host adapter that turns stop requests into a message on the service's signal channel
#[derive(Debug, Clone)]
pub struct ServiceHost {
    signal_sender: mpsc::UnboundedSender<SignalType>,
}

impl ServiceHost {
    pub fn new(signal_sender: mpsc::UnboundedSender<SignalType>) -> Self {
        Self { signal_sender }
    }
}

impl HostControl for ServiceHost {
    fn request_stop(&self) {
        info!("Scheduler requested service shutdown");
        if let Err(e) = self.signal_sender.send(SignalType::StopRequested) {
            warn!("Failed to deliver stop request, service already stopping: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_standard_file_system_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested/dir");
        let file = dir.join("settings.toml");
        let fs = StandardFileSystem;

        assert!(!fs.exists(&file));
        fs.create_dir_all(&dir).unwrap();
        fs.write(&file, "timer_option_key = \"30s\"\n").unwrap();

        assert!(fs.exists(&file));
        assert_eq!(
            fs.read_to_string(&file).unwrap(),
            "timer_option_key = \"30s\"\n"
        );
    }

    #[test]
    fn test_read_missing_file_names_path() {
        let err = StandardFileSystem
            .read_to_string(Path::new("/definitely/not/here.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }

    #[tokio::test]
    async fn test_service_host_sends_stop_request() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let host = ServiceHost::new(tx);

        host.request_stop();

        assert!(matches!(rx.recv().await, Some(SignalType::StopRequested)));
    }

    #[test]
    fn test_service_host_tolerates_closed_channel() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        ServiceHost::new(tx).request_stop();
    }
}
