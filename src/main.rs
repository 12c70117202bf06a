use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use popup_service::config::Config;
use popup_service::logging::{self, LoggingConfig};
use popup_service::notifications::NotificationManager;
use popup_service::settings::{FileSettingsStore, SettingsBridge};
use popup_service::system::StandardFileSystem;
use popup_service::timer::TimerOption;
use popup_service::PopupService;

#[derive(Parser)]
#[command(name = "popup-service")]
#[command(about = "Background service that posts a reminder notification on a repeating interval")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reminder service in the foreground
    Daemon,
    /// Persist a new reminder interval (a running daemon picks it up)
    SetInterval {
        /// One of: "10s", "30s", "60s", "30 min", "60 min", "Deactivated"
        option: String,
    },
    /// Show the persisted reminder interval
    ShowInterval,
    /// List the selectable intervals
    ListOptions,
    /// Validate configuration file
    CheckConfig,
    /// Post a test notification
    TestNotification,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    let runs_daemon = matches!(cli.command, None | Some(Commands::Daemon));
    let logging_config = if runs_daemon {
        LoggingConfig::from_general(&config.general, cli.verbose)
    } else {
        LoggingConfig::console_only(cli.verbose)
    };
    let (_guard, log_dir) = logging::initialize_logging(logging_config)?;

    if let Some(dir) = &log_dir {
        info!("Logging to {}", dir.display());
        if let Err(e) = logging::cleanup_old_logs(dir, config.general.log_retention_days) {
            warn!("Failed to clean up old logs: {:#}", e);
        }
    }

    match cli.command {
        Some(Commands::Daemon) => run_daemon(config).await?,
        Some(Commands::SetInterval { option }) => set_interval(&config, &option).await?,
        Some(Commands::ShowInterval) => show_interval(&config).await?,
        Some(Commands::ListOptions) => list_options(),
        Some(Commands::CheckConfig) => check_config(&config)?,
        Some(Commands::TestNotification) => {
            NotificationManager::desktop(&config.notifications).test_notification()?
        }
        None => {
            info!("No command specified, running in daemon mode");
            run_daemon(config).await?;
        }
    }

    Ok(())
}

async fn run_daemon(config: Config) -> Result<()> {
    info!("Starting daemon mode");

    let service = PopupService::new_production(config)?;

    println!("Popup service started");
    println!("  Press Ctrl+C to stop, send SIGHUP to re-read settings");

    service.run_with_signals().await?;

    println!("Popup service stopped");
    Ok(())
}

fn settings_bridge(config: &Config) -> Result<SettingsBridge<FileSettingsStore<StandardFileSystem>>> {
    let path = config.settings.resolved_path()?;
    Ok(SettingsBridge::new(FileSettingsStore::new_production(path)))
}

async fn set_interval(config: &Config, label: &str) -> Result<()> {
    let option = TimerOption::parse(label).unwrap_or_else(|| {
        warn!(
            "Unknown interval '{}' (expected one of: {}), storing {}",
            label,
            option_labels().join(", "),
            TimerOption::Deactivated
        );
        TimerOption::Deactivated
    });

    let settings = settings_bridge(config)?;
    settings
        .save(option)
        .await
        .context("Failed to persist reminder interval")?;

    println!("Reminder interval set to {}", option);
    println!("  Stored in {}", settings.store().path().display());
    Ok(())
}

async fn show_interval(config: &Config) -> Result<()> {
    let settings = settings_bridge(config)?;
    let option = settings.try_load().await?;

    match option.duration() {
        Some(period) => println!("Reminder interval: {} (every {:?})", option, period),
        None => println!("Reminder interval: {} (no reminders)", option),
    }
    Ok(())
}

fn list_options() {
    println!("Available intervals:");
    for option in TimerOption::ALL {
        match option.duration() {
            Some(period) => println!("  {:<12} every {:?}", option.label(), period),
            None => println!("  {:<12} reminders off", option.label()),
        }
    }
}

fn option_labels() -> Vec<&'static str> {
    TimerOption::ALL.iter().map(|option| option.label()).collect()
}

fn check_config(config: &Config) -> Result<()> {
    info!("Validating configuration");

    let settings_path = config.settings.resolved_path()?;

    println!("Configuration validation:");
    println!("  ✓ Configuration file parsed successfully");
    println!("  ✓ Log level: {}", config.general.log_level);
    println!("  ✓ Settings file: {}", settings_path.display());
    match config.settings.poll_interval() {
        Some(interval) => println!("  ✓ Settings watcher: every {:?}", interval),
        None => println!("  ✓ Settings watcher: disabled"),
    }
    println!(
        "  ✓ Notifications: {} (title \"{}\")",
        if config.notifications.enabled { "enabled" } else { "disabled" },
        config.notifications.title
    );

    Ok(())
}
