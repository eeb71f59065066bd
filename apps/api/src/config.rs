//! API configuration module.
//!
//! Configuration is layered with the `config` crate:
//!
//! ```text
//! built-in defaults  <  truestate.toml (optional)  <  environment variables
//! ```
//!
//! The file path defaults to `truestate.toml` in the working directory and
//! can be moved with `TRUESTATE_CONFIG`. Environment keys are the field names
//! upper-cased (`DATABASE_URL`, `PORT`, `DB_MAX_CONNECTIONS`, ...).

use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use truestate_db::DbConfig;

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "TRUESTATE_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "truestate.toml";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_RETRY_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";

/// API configuration.
#[derive(Clone, Deserialize)]
pub struct ApiConfig {
    /// Interface to bind
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// PostgreSQL connection string (required)
    pub database_url: String,

    /// Pool upper bound
    pub db_max_connections: u32,

    /// Connections kept open while idle
    pub db_min_connections: u32,

    /// Seconds to wait for a pooled connection
    pub db_connect_timeout_secs: u64,

    /// Server-side statement timeout in seconds
    pub db_statement_timeout_secs: u64,

    /// Seconds to keep retrying the database at startup
    pub db_connect_retry_secs: u64,

    /// Comma-separated allowed origins; empty allows any origin
    pub cors_origins: String,

    /// Fallback filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url: String::new(),
            db_max_connections: DEFAULT_MAX_CONNECTIONS,
            db_min_connections: DEFAULT_MIN_CONNECTIONS,
            db_connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            db_statement_timeout_secs: DEFAULT_STATEMENT_TIMEOUT_SECS,
            db_connect_retry_secs: DEFAULT_CONNECT_RETRY_SECS,
            cors_origins: String::new(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &"<redacted>")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_connect_timeout_secs", &self.db_connect_timeout_secs)
            .field("db_statement_timeout_secs", &self.db_statement_timeout_secs)
            .field("db_connect_retry_secs", &self.db_connect_retry_secs)
            .field("cors_origins", &self.cors_origins)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from the optional file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path, Environment::default())
    }

    /// Load configuration from `path` (if it exists) and `env`.
    pub fn load_from(path: &str, env: Environment) -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let settings = Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("database_url", defaults.database_url)?
            .set_default("db_max_connections", i64::from(defaults.db_max_connections))?
            .set_default("db_min_connections", i64::from(defaults.db_min_connections))?
            .set_default("db_connect_timeout_secs", defaults.db_connect_timeout_secs as i64)?
            .set_default("db_statement_timeout_secs", defaults.db_statement_timeout_secs as i64)?
            .set_default("db_connect_retry_secs", defaults.db_connect_retry_secs as i64)?
            .set_default("cors_origins", defaults.cors_origins)?
            .set_default("log_level", defaults.log_level)?
            .add_source(File::with_name(path).required(false))
            .add_source(env.try_parsing(true))
            .build()?;

        let config: ApiConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints the types cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::MissingRequired("DATABASE_URL".to_string()));
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidValue("PORT".to_string()));
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }
        if self.db_min_connections > self.db_max_connections {
            return Err(ConfigError::InvalidValue("DB_MIN_CONNECTIONS".to_string()));
        }
        if self.db_statement_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "DB_STATEMENT_TIMEOUT_SECS".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Allowed CORS origins; empty means any.
    pub fn cors_origin_list(&self) -> Vec<String> {
        truestate_core::filter::split_list(Some(&self.cors_origins))
    }

    /// Pool settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_url.clone())
            .max_connections(self.db_max_connections)
            .min_connections(self.db_min_connections)
            .connect_timeout(Duration::from_secs(self.db_connect_timeout_secs))
            .statement_timeout(Duration::from_secs(self.db_statement_timeout_secs))
            .connect_retry_window(Duration::from_secs(self.db_connect_retry_secs))
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
