//! Configuration management for Pustaka server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Placeholder shipped in `config/default.toml`; never meant for production.
pub const PLACEHOLDER_MASTER_KEY: &str = "change-this-master-key";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    /// Key accepted in `X-API-Key` for staff (petugas) requests
    pub master_key: String,
    /// Minimum length of an access key proposed by a member at login
    pub min_api_key_length: usize,
    /// Whether `POST /members/register` is reachable without a key
    pub public_member_registration: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // e.g. PUSTAKA_SERVER__PORT=8080
            .add_source(
                Environment::with_prefix("PUSTAKA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("auth.master_key", env::var("API_KEY").ok())?
            .build()?;

        config.try_deserialize()
    }

    /// True when the master key was never changed from the shipped placeholder
    pub fn uses_placeholder_master_key(&self) -> bool {
        self.auth.master_key == PLACEHOLDER_MASTER_KEY
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://pustaka.db".to_string(),
            max_connections: 8,
            min_connections: 1,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            master_key: PLACEHOLDER_MASTER_KEY.to_string(),
            min_api_key_length: 12,
            public_member_registration: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
