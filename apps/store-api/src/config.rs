//! Store API configuration module.
//!
//! Layers, lowest priority first:
//!
//! ```text
//! built-in defaults ─► store-api.toml (optional) ─► STORE_* environment
//! ```
//!
//! `.env` is loaded into the environment by `main` before this runs.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use store_db::DbConfig;

/// Name of the optional configuration file, without extension.
const CONFIG_FILE: &str = "store-api";

/// Store API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP port
    pub port: u16,

    /// Interface to bind
    pub bind_addr: IpAddr,

    /// SQLite file for users, products and inventory
    pub database_path: PathBuf,

    /// SQLite file for orders and sales
    pub documents_path: PathBuf,

    /// Pool size for each store
    pub max_connections: u32,
}

impl AppConfig {
    /// Load configuration from defaults, the optional file and `STORE_*`
    /// environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .set_default("port", 3000_i64)?
            .set_default("bind_addr", "0.0.0.0")?
            .set_default("database_path", "./data/store.db")?
            .set_default("documents_path", "./data/documents.db")?
            .set_default("max_connections", 5_i64)?
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix("STORE").try_parsing(true))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue("STORE_PORT".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("STORE_MAX_CONNECTIONS".to_string()));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired("STORE_DATABASE_PATH".to_string()));
        }
        if self.documents_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired("STORE_DOCUMENTS_PATH".to_string()));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    pub fn relational_db(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.max_connections)
    }

    pub fn document_db(&self) -> DbConfig {
        DbConfig::new(&self.documents_path).max_connections(self.max_connections)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),
}
