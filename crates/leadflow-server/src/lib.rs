//! Leadflow Server
//!
//! JSON over HTTP for operator and source management, contact registration,
//! and reporting. Contact registration runs the distribution engine.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod schemas;

use config::ServerConfig;
use handlers::{create_router, AppState, ServiceInfo};
use leadflow_store::{SqliteStore, StoreError};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Database could not be opened
    #[error("Failed to open database: {0}")]
    Store(#[from] StoreError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(config: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter()));

    // A subscriber may already be installed when embedded in another process
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Start the HTTP server
///
/// Validates configuration, opens the database (creating the schema if needed)
/// and serves until the process is stopped.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    config.validate()?;
    init_tracing(&config);

    info!("Starting {} {}", config.app_name, config.app_version);
    info!("Database: {}", config.database_path);
    if !config.api_prefix.is_empty() {
        info!("API prefix: {}", config.api_prefix);
    }

    let store = SqliteStore::new(&config.database_path)?;
    let state = AppState::new(store, ServiceInfo::from(&config));
    let app = create_router(state, &config.api_prefix);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
