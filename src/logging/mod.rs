use anyhow::Result;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

use crate::config::GeneralConfig;

const LOG_FILE_NAME: &str = "popup-service.log";

/// Logging configuration for the daemon and CLI
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    pub file_output: bool,
    pub console_output: bool,
    pub log_dir: Option<PathBuf>,
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            file_output: true,
            console_output: true,
            log_dir: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Build from the `[general]` config section; `verbose` forces debug level
    pub fn from_general(general: &GeneralConfig, verbose: bool) -> Self {
        let level = if verbose {
            Level::DEBUG
        } else {
            Level::from_str(&general.log_level).unwrap_or(Level::INFO)
        };

        Self {
            level,
            file_output: general.file_logging,
            json_format: general.json_logs,
            ..Self::default()
        }
    }

    /// Console-only logging for one-shot CLI commands
    pub fn console_only(verbose: bool) -> Self {
        Self {
            level: if verbose { Level::DEBUG } else { Level::INFO },
            file_output: false,
            ..Self::default()
        }
    }

    pub fn filter_directive(&self) -> String {
        format!("popup_service={}", self.level.as_str().to_lowercase())
    }
}

/// Initialize logging with daily file rotation and optional JSON output
///
/// Returns the appender guard (keep it alive for the process lifetime) and the log directory
pub fn initialize_logging(config: LoggingConfig) -> Result<(Option<WorkerGuard>, Option<PathBuf>)> {
    let mut layers = Vec::new();
    let mut guard = None;

    let env_filter = EnvFilter::new(config.filter_directive());

    if config.console_output {
        let console_layer = if config.json_format {
            fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .boxed()
        } else {
            fmt::layer().with_target(true).boxed()
        };
        layers.push(console_layer);
    }

    let log_dir = if config.file_output {
        let dir = match config.log_dir.clone() {
            Some(dir) => dir,
            None => get_default_log_dir()?,
        };
        std::fs::create_dir_all(&dir)?;

        let file_appender = tracing_appender::rolling::daily(&dir, LOG_FILE_NAME);
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(worker_guard);

        let file_layer = if config.json_format {
            fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(non_blocking)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed()
        };
        layers.push(file_layer);

        Some(dir)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;

    Ok((guard, log_dir))
}

pub fn get_default_log_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .ok_or_else(|| anyhow::anyhow!("Failed to get home directory"))?;
    Ok(data_dir.join("popup-service/logs"))
}

/// Remove rotated log files older than `keep_days`
pub fn cleanup_old_logs(log_dir: &Path, keep_days: u64) -> Result<usize> {
    use std::time::{Duration, SystemTime};

    if !log_dir.exists() {
        return Ok(0);
    }

    let cutoff_time = SystemTime::now()
        .checked_sub(Duration::from_secs(60 * 60 * 24 * keep_days))
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let mut cleaned_count = 0;

    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();

        let is_log = path.is_file()
            && path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(LOG_FILE_NAME));
        if !is_log {
            continue;
        }

        let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        if modified >= cutoff_time {
            continue;
        }

        match std::fs::remove_file(&path) {
            Ok(()) => {
                cleaned_count += 1;
                tracing::debug!("Removed old log file: {}", path.display());
            }
            Err(e) => tracing::warn!("Failed to remove old log file {}: {}", path.display(), e),
        }
    }

    if cleaned_count > 0 {
        tracing::info!(
            "Cleaned up {} old log files from {}",
            cleaned_count,
            log_dir.display()
        );
    }

    Ok(cleaned_count)
}
