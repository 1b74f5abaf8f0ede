//! Floodwatch monitor service
//!
//! Headless monitoring client for a flood-infrastructure-damage reporting
//! backend: polls incident reports and weather, derives statistics, and
//! raises time-limited alerts for newly-arrived critical incidents.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

use chrono::Utc;
use clap::{Parser, Subcommand};
use floodwatch_core::{Criticality, FilterSelection, SessionStore};
use floodwatch_monitor::{MonitorConfig, MonitorService, Result, filter};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};

/// Command line interface for the floodwatch monitor service
#[derive(Parser)]
#[command(
    name = "floodwatch-monitor",
    version = env!("CARGO_PKG_VERSION"),
    about = "Flood infrastructure damage monitoring client",
    long_about = "Polls a flood-incident reporting backend on a fixed interval, maintains active and all-time report views, and raises time-limited alerts when new critical incidents arrive."
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable structured JSON logging
    #[arg(long)]
    json: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Start the monitoring service (default)
    Start,

    /// Validate or show configuration
    Config {
        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,

        /// Validate configuration values
        #[arg(short, long)]
        validate: bool,
    },

    /// Fetch reports once and export the filtered active set as JSON
    Export {
        /// Directory to write the export into
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,

        /// Keep only reports from this district
        #[arg(long)]
        district: Option<String>,

        /// Keep only reports at this severity (critical, high, medium)
        #[arg(long)]
        criticality: Option<String>,

        /// Keep only reports within this many time-range units
        #[arg(long)]
        days: Option<u32>,
    },

    /// Resolve one report on the backend
    Resolve {
        /// Report identifier
        #[arg(value_name = "ID")]
        id: i64,
    },

    /// Start a local session
    Login {
        /// Username to sign in as
        #[arg(value_name = "USERNAME")]
        username: String,

        /// Sign in with the admin role
        #[arg(long)]
        admin: bool,
    },

    /// Clear the local session
    Logout,
}

/// Main entry point for the monitor service
///
/// # Errors
///
/// Returns error if service initialization or execution fails
///
/// # Panics
///
/// Panics if the tokio runtime cannot be initialized
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (for development convenience)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: .env file not loaded: {e}");
    }

    let cli = Cli::parse();

    init_logging(&cli);

    let config = load_config(cli.config.as_deref()).await?;

    match cli.command {
        Some(Commands::Config { show, validate }) => handle_config_command(&config, show, validate),
        Some(Commands::Export {
            output,
            district,
            criticality,
            days,
        }) => export_reports(config, &output, district, criticality, days).await,
        Some(Commands::Resolve { id }) => resolve_report(config, id).await,
        Some(Commands::Login { username, admin }) => login(&config, username, admin),
        Some(Commands::Logout) => logout(&config),
        Some(Commands::Start) | None => run_service(config).await,
    }
}

/// Persist a new local session
fn login(config: &MonitorConfig, username: String, admin: bool) -> Result<()> {
    use floodwatch_core::{User, UserRole};

    let role = if admin { UserRole::Admin } else { UserRole::User };
    let sessions = SessionStore::new(&config.app.session);
    let session = sessions.save(User { username, role }, Utc::now())?;

    println!(
        "Signed in as {} until {}",
        session.user.username, session.expiry
    );
    Ok(())
}

/// Remove any persisted local session
fn logout(config: &MonitorConfig) -> Result<()> {
    SessionStore::new(&config.app.session).clear()?;
    println!("Signed out");
    Ok(())
}

/// Initialize logging system
fn init_logging(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if cli.json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = cli.log_level,
        "floodwatch monitor starting"
    );
}

/// Load configuration from file or environment
async fn load_config(config_path: Option<&std::path::Path>) -> Result<MonitorConfig> {
    if let Some(path) = config_path {
        info!("loading configuration from: {}", path.display());

        let config_content = tokio::fs::read_to_string(path).await.map_err(|e| {
            floodwatch_core::Error::configuration(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let config: MonitorConfig = toml::from_str(&config_content).map_err(|e| {
            floodwatch_core::Error::configuration(format!("failed to parse config file: {e}"))
        })?;

        Ok(config)
    } else {
        info!("loading default configuration");
        MonitorConfig::load()
    }
}

/// Run the monitoring service until a shutdown signal arrives
async fn run_service(config: MonitorConfig) -> Result<()> {
    let sessions = SessionStore::new(&config.app.session);
    match sessions.load_valid(Utc::now())? {
        Some(session) => info!(username = %session.user.username, "resuming session"),
        None => info!("no active session, running read-only"),
    }

    let service = MonitorService::new(config)?;

    service.start()?;
    info!("monitoring service is running, press Ctrl+C to stop");

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("received Ctrl+C, shutting down gracefully");
        }
        () = service.wait_for_shutdown() => {
            info!("service requested shutdown");
        }
    }

    service.stop().await;
    info!("service stopped successfully");
    Ok(())
}

/// Show or validate the resolved configuration
fn handle_config_command(config: &MonitorConfig, show: bool, validate: bool) -> Result<()> {
    if validate {
        match config.validate() {
            Ok(()) => println!("Configuration is valid"),
            Err(e) => {
                error!("configuration invalid: {e}");
                return Err(e);
            }
        }
    }

    if show {
        let rendered = toml::to_string_pretty(config)
            .map_err(|e| floodwatch_core::Error::configuration(e.to_string()))?;
        println!("{rendered}");
    }

    if !show && !validate {
        println!("Use --show to print the configuration or --validate to check it");
    }

    Ok(())
}

/// One-shot fetch of the active set, filtered and written to disk
async fn export_reports(
    config: MonitorConfig,
    output: &std::path::Path,
    district: Option<String>,
    criticality: Option<String>,
    days: Option<u32>,
) -> Result<()> {
    let selection = FilterSelection {
        district,
        criticality: criticality.as_deref().map(parse_criticality).transpose()?,
        time_range_days: days,
    };

    let service = MonitorService::new(config)?;
    service.refresh().await;

    let active = service.store().active_reports();
    let filtered = filter::apply(&active, &selection, Utc::now());
    let path = floodwatch_monitor::export::export_filtered(&filtered, output)?;

    println!("Exported {} reports to {}", filtered.len(), path.display());
    Ok(())
}

/// One-shot resolution of a single report
///
/// Resolution is an administrative action; a valid admin session must be
/// present.
async fn resolve_report(config: MonitorConfig, id: i64) -> Result<()> {
    let sessions = SessionStore::new(&config.app.session);
    let session = sessions
        .load_valid(Utc::now())?
        .ok_or_else(|| floodwatch_core::Error::session("no active session"))?;
    if !session.user.is_admin() {
        return Err(floodwatch_core::Error::session(
            "resolving incidents requires an admin session",
        ));
    }

    let service = MonitorService::new(config)?;
    service.refresh().await;

    match service.resolve(id).await {
        Ok(()) => {
            println!("Report {id} marked as resolved");
            Ok(())
        }
        Err(e) => {
            error!(report_id = id, "failed to resolve report: {e}");
            Err(e)
        }
    }
}

/// Parse a criticality label from the command line
fn parse_criticality(label: &str) -> Result<Criticality> {
    match label.to_lowercase().as_str() {
        "critical" => Ok(Criticality::Critical),
        "high" => Ok(Criticality::High),
        "medium" => Ok(Criticality::Medium),
        other => Err(floodwatch_core::Error::configuration(format!(
            "unknown criticality {other:?} (expected critical, high, or medium)"
        ))),
    }
}
