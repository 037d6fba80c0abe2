//! Service configuration
//!
//! Values are layered with the `config` crate: built-in defaults, then an
//! optional `skyparty.toml` in the working directory, then `SKYPARTY_*`
//! environment variables using `__` between nested keys
//! (`SKYPARTY_SERVER__PORT=8080`).

use std::{net::SocketAddr, path::PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Top-level configuration for the API service
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Which collection store to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON document per collection under `data_dir`
    File,
    /// PostgreSQL, configured through `DATABASE_URL`
    Postgres,
    /// Process memory, lost on exit
    Memory,
}

/// Storage settings
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from defaults, `skyparty.toml` and the environment
    pub fn load() -> Result<Self> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3003)?
            .set_default("storage.backend", "file")?
            .set_default("storage.data_dir", "data")?
            .add_source(File::with_name("skyparty").required(false))
            .add_source(
                Environment::with_prefix("SKYPARTY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Socket address the HTTP server binds to
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid listen address {}:{}",
                    self.server.host, self.server.port
                )
            })
    }
}
