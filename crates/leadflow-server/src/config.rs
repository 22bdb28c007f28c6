//! Configuration file parsing for the server.
//!
//! Loads bind address, database location, service metadata and the API path
//! prefix from a TOML file.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// Field present but unusable
    #[error("Invalid configuration field {field}: {reason}")]
    InvalidField {
        /// Field name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8000)
    pub bind_port: u16,

    /// SQLite database file, or ":memory:"
    pub database_path: String,

    /// Service name shown on the root endpoint
    pub app_name: String,

    /// One-line service description
    #[serde(default)]
    pub app_description: String,

    /// Service version string
    #[serde(default = "default_app_version")]
    pub app_version: String,

    /// Verbose logging when `RUST_LOG` is not set
    #[serde(default)]
    pub debug: bool,

    /// Path prefix for every API route (e.g., "/api/v1"); empty mounts at the root
    #[serde(default)]
    pub api_prefix: String,
}

fn default_app_version() -> String {
    "1.0.0".to_string()
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check field values that TOML parsing alone cannot enforce
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.is_empty() {
            return Err(ConfigError::MissingField("database_path".to_string()));
        }

        if !self.api_prefix.is_empty() {
            if !self.api_prefix.starts_with('/') {
                return Err(ConfigError::InvalidField {
                    field: "api_prefix",
                    reason: "must start with '/'".to_string(),
                });
            }
            if self.api_prefix.ends_with('/') {
                return Err(ConfigError::InvalidField {
                    field: "api_prefix",
                    reason: "must not end with '/'".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Development configuration: local port, file database, no prefix
    pub fn default_dev_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8000,
            database_path: "leadflow.db".to_string(),
            app_name: "Leadflow".to_string(),
            app_description: "Weighted distribution of inbound contacts to operators".to_string(),
            app_version: default_app_version(),
            debug: true,
            api_prefix: String::new(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }

    /// Default log filter when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}
