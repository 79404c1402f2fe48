//! Settings for the server binary, one sub-module per TOML table.
//!
//! Every field has a default, so an empty file yields a runnable
//! development setup. Components receive their section by value; nothing
//! reads settings from globals.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod transaction;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::{AuthConfig, RefreshPolicy};
pub use self::database::{DatabaseBackend, DatabaseConfig};
pub use self::logging::{LogFormat, LoggingConfig};
pub use self::transaction::TransactionConfig;

use crate::error::AppError;

/// All settings, merged from `config/default.toml`, `config/{env}.toml`,
/// and `CLASSROOM__*` variables (later sources win).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Token signing and lifetimes.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Per-request transaction settings.
    #[serde(default)]
    pub transaction: TransactionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Read and merge every source for `env`. Missing files are skipped.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CLASSROOM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Cannot read settings: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Invalid settings: {e}")))
    }
}
