// ⚙️ Application Config - defaults < expense-tracker.toml < EXPENSE_TRACKER__* env
//
// Policy settings (budget, limits, unwanted, block mode) are NOT here; they
// live in the record store's settings table.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Looked up next to the working directory, any supported extension
pub const DEFAULT_CONFIG_NAME: &str = "expense-tracker";
pub const ENV_PREFIX: &str = "EXPENSE_TRACKER";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "expenses.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    /// Fallback filter when RUST_LOG is not set
    pub log_level: String,
    pub currency_symbol: String,
    pub trend_months: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            log_level: "info".to_string(),
            currency_symbol: crate::policy::DEFAULT_CURRENCY_SYMBOL.to_string(),
            trend_months: 6,
        }
    }
}

impl AppConfig {
    /// Load from `path` (must exist) or the optional default file, then env
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
