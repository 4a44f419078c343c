//! csvdb - CLI client
//!
//! Reads queries line by line and prints the CSV the query server answers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use csvdb::client::Client;
use csvdb::config::{Settings, DEFAULT_SETTINGS_FILE};

const PROMPT: &str = "> ";

/// csvdb interactive client
#[derive(Parser, Debug)]
#[command(name = "csvdb-cli", version, about = "csvdb interactive client")]
struct Args {
    /// Settings file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_SETTINGS_FILE, env = "CSVDB_CONFIG")]
    config: PathBuf,

    /// Query server address (overrides settings)
    #[arg(short, long, env = "CSVDB_SERVER_ADDR")]
    server: Option<String>,

    /// Run a single query and exit
    #[arg(short = 'e', long, value_name = "QUERY")]
    execute: Option<String>,

    /// Log level
    #[arg(long, default_value = "warn", env = "CSVDB_LOG_LEVEL")]
    log_level: String,
}

fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("csvdb={}", args.log_level)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print a reply the way `puts` would: exactly one trailing newline
fn print_reply(reply: &str) {
    if reply.ends_with('\n') {
        print!("{}", reply);
    } else {
        println!("{}", reply);
    }
}

fn repl(client: &mut Client) -> Result<()> {
    let mut editor = DefaultEditor::new().context("Failed to initialize line editor")?;

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line.as_str());

                let reply = client.work(&line).context("Query server unavailable")?;
                print_reply(&reply);
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let mut settings = Settings::load_or_default(&args.config)
        .with_context(|| format!("Failed to load settings from {}", args.config.display()))?;
    if let Some(addr) = &args.server {
        settings = settings.server_addr(addr.clone());
    }

    let mut client = Client::connect(&settings.server_addr)
        .with_context(|| format!("Failed to connect to {}", settings.server_addr))?;

    match &args.execute {
        Some(query) => {
            let reply = client.work(query).context("Query server unavailable")?;
            print_reply(&reply);
            Ok(())
        }
        None => repl(&mut client),
    }
}
