//! csvdb - storage role
//!
//! Serves raw file contents by name out of the data directory.

use std::net::TcpListener;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use csvdb::config::{Settings, DEFAULT_SETTINGS_FILE};
use csvdb::net;
use csvdb::storage::Storage;

/// csvdb storage role
#[derive(Parser, Debug)]
#[command(name = "csvdb-storage", version, about = "csvdb storage role")]
struct Args {
    /// Settings file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_SETTINGS_FILE, env = "CSVDB_CONFIG")]
    config: PathBuf,

    /// Address to listen on (overrides settings)
    #[arg(short, long, env = "CSVDB_STORAGE_ADDR")]
    listen: Option<String>,

    /// Data directory (overrides settings)
    #[arg(short, long, value_name = "DIR", env = "CSVDB_DATA_PATH")]
    data_path: Option<PathBuf>,

    /// Number of cached files (overrides settings)
    #[arg(long, env = "CSVDB_CACHE_CAPACITY")]
    cache_capacity: Option<usize>,

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
        .or_else(|_| EnvFilter::try_new(format!("csvdb={level},csvdb_storage={level}")))
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
        settings = settings.storage_addr(addr.clone());
    }
    if let Some(path) = &args.data_path {
        settings = settings.data_path(path.clone());
    }
    if let Some(capacity) = args.cache_capacity {
        settings = settings.cache_capacity(capacity);
    }

    Ok(settings)
}

fn serve(settings: Settings) -> csvdb::Result<()> {
    let listener = TcpListener::bind(&settings.storage_addr)?;
    let mut storage = Storage::from_settings(&settings);

    info!(
        data_path = %storage.root().display(),
        cache_capacity = storage.cache().capacity(),
        "storage ready"
    );
    net::serve(listener, |file_name| Ok(storage.work(file_name)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let settings = load_settings(&args)?;
    info!(addr = %settings.storage_addr, "starting storage");

    let storage = tokio::task::spawn_blocking(move || serve(settings));

    tokio::select! {
        result = storage => {
            result.context("Storage task panicked")?.context("Storage error")?;
        }
        _ = signal::ctrl_c() => {
            info!("Interrupt received, shutting down");
            std::process::exit(0);
        }
    }

    Ok(())
}
