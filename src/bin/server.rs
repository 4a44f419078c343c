//! csvdb - query server
//!
//! Listens for client queries and answers them with CSV. Tables are loaded
//! from the storage role, or straight from disk with `--embedded`.

use std::net::TcpListener;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use csvdb::config::{Settings, DEFAULT_SETTINGS_FILE};
use csvdb::server::{QueryServer, RemoteSource};
use csvdb::storage::Storage;
use csvdb::table::JoinStrategy;

/// csvdb query server
#[derive(Parser, Debug)]
#[command(name = "csvdb-server", version, about = "csvdb query server")]
struct Args {
    /// Settings file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_SETTINGS_FILE, env = "CSVDB_CONFIG")]
    config: PathBuf,

    /// Address to listen on (overrides settings)
    #[arg(short, long, env = "CSVDB_SERVER_ADDR")]
    listen: Option<String>,

    /// Storage role address (overrides settings)
    #[arg(short, long, env = "CSVDB_STORAGE_ADDR")]
    storage: Option<String>,

    /// Read files directly instead of asking the storage role
    #[arg(long)]
    embedded: bool,

    /// Data directory used with --embedded (overrides settings)
    #[arg(short, long, value_name = "DIR", env = "CSVDB_DATA_PATH")]
    data_path: Option<PathBuf>,

    /// Join algorithm: hash or sort_merge (overrides settings)
    #[arg(short, long, env = "CSVDB_JOIN_STRATEGY")]
    join_strategy: Option<JoinStrategy>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Log level
    #[arg(long, default_value = "info", env = "CSVDB_LOG_LEVEL")]
    log_level: String,
}

fn init_logging(args: &Args) {
    let level = if args.verbose { "debug" } else { &args.log_level };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("csvdb={level},csvdb_server={level}")))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::load_or_default(&args.config)
        .with_context(|| format!("Failed to load settings from {}", args.config.display()))?;

    if let Some(addr) = &args.listen {
        settings = settings.server_addr(addr.clone());
    }
    if let Some(addr) = &args.storage {
        settings = settings.storage_addr(addr.clone());
    }
    if let Some(path) = &args.data_path {
        settings = settings.data_path(path.clone());
    }
    if let Some(strategy) = args.join_strategy {
        settings = settings.join_strategy(strategy);
    }

    Ok(settings)
}

fn serve(settings: Settings, embedded: bool) -> csvdb::Result<()> {
    let listener = TcpListener::bind(&settings.server_addr)?;

    if embedded {
        info!(data_path = %settings.data_path.display(), "using embedded storage");
        QueryServer::new(Storage::from_settings(&settings))
            .join_strategy(settings.join_strategy)
            .run(listener)
    } else {
        info!(storage = %settings.storage_addr, "using remote storage");
        QueryServer::new(RemoteSource::from_settings(&settings))
            .join_strategy(settings.join_strategy)
            .run(listener)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let settings = load_settings(&args)?;
    info!(addr = %settings.server_addr, "starting query server");

    let embedded = args.embedded;
    let server = tokio::task::spawn_blocking(move || serve(settings, embedded));

    tokio::select! {
        result = server => {
            result.context("Server task panicked")?.context("Server error")?;
        }
        _ = signal::ctrl_c() => {
            info!("Interrupt received, shutting down");
            std::process::exit(0);
        }
    }

    Ok(())
}
