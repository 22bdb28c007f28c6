//! Leadflow server binary
//!
//! Starts the HTTP server that distributes inbound contacts to operators.

use anyhow::Context;
use clap::Parser;
use leadflow_server::{config::ServerConfig, start_server};
use std::path::PathBuf;

/// Leadflow - Weighted distribution of inbound contacts to operators.
#[derive(Debug, Parser)]
#[command(name = "leadflow-server")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database file, overriding the configuration
    #[arg(short, long, env = "LEADFLOW_DATABASE")]
    database: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            eprintln!("Warning: No config file specified, using default development configuration");
            eprintln!("Usage: leadflow-server --config <path-to-config.toml>");
            eprintln!();
            ServerConfig::default_dev_config()
        }
    };

    if let Some(database) = cli.database {
        config.database_path = database;
    }

    start_server(config).await?;

    Ok(())
}
