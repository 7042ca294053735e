use std::{env, net::SocketAddr, time::Duration};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::AppResult;

/// Application configuration.
///
/// Contains all configuration settings for the library service,
/// including server, database, and tracing settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Distribution metadata configuration
    pub distribution: DistributionConfig,
    /// Server configuration settings
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Tracing configuration
    pub tracing: TracingConfig,
}

/// Server configuration settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// gRPC server bind address
    pub grpc_address: SocketAddr,
}

/// Database configuration.
///
/// Supports either in-memory storage or `PostgreSQL` database.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind")]
pub enum DatabaseConfig {
    /// In-memory database storage
    Memory,
    /// `PostgreSQL` database connection
    Postgres(PostgresConfig),
}

/// `PostgreSQL` database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PostgresConfig {
    /// `PostgreSQL` connection string
    pub connection: String,
    /// Maximum number of pooled connections
    #[serde(default = "PostgresConfig::default_max_connections")]
    pub max_connections: usize,
    /// How long a request may wait for a pooled connection, in milliseconds
    #[serde(default = "PostgresConfig::default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

/// Tracing configuration.
///
/// Controls how tracing data is output from the service.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind")]
pub enum TracingConfig {
    /// In-memory tracing (no output)
    Memory,
    /// Standard output tracing
    Stdout,
}

/// Distribution metadata configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DistributionConfig {
    /// Distribution name
    pub name: String,
    /// Distribution version
    pub version: Option<String>,
}

const CONFIG_PATH_ENV: &str = "LIBRARY_CONFIG_PATH";
const CONFIG_DIR: &str = "config";
const ENV_PREFIX: &str = "LIBRARY";
const VERSION: &str = env!("CARGO_PKG_VERSION");

const DISTRIBUTION_VERSION_KEY: &str = "distribution.version";

impl AppConfig {
    /// Loads configuration from files and environment variables.
    ///
    /// Sources, later ones overriding earlier ones:
    /// `config/default`, `config/local`, the file named by
    /// `LIBRARY_CONFIG_PATH`, and `LIBRARY_*` environment variables such as
    /// `LIBRARY_DATABASE__CONNECTION`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load() -> AppResult<Self> {
        let mut config_builder =
            Config::builder().set_default(DISTRIBUTION_VERSION_KEY, VERSION)?;

        // Initial "default" configuration file
        config_builder =
            config_builder.add_source(File::with_name(&format!("{CONFIG_DIR}/default")));

        // Add in a local configuration file
        // This file shouldn't be checked in to git
        config_builder = config_builder
            .add_source(File::with_name(&format!("{CONFIG_DIR}/local")).required(false));

        // Add override settings file.
        if let Ok(override_path) = env::var(CONFIG_PATH_ENV) {
            config_builder =
                config_builder.add_source(File::with_name(&override_path).required(false));
        }

        // Add in settings from the environment (with a prefix of LIBRARY)
        config_builder =
            config_builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

        Ok(config_builder.build()?.try_deserialize()?)
    }
}

impl PostgresConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    fn default_max_connections() -> usize {
        16
    }

    fn default_acquire_timeout_ms() -> u64 {
        5_000
    }
}
