//! Application settings loaded from `config.toml` and the environment.
//!
//! Resolution order, last one wins: built-in defaults, the TOML file (path from
//! `LEDGER_CONFIG`, default `./config.toml`), then `DATABASE_URL` / `LEDGER_CURRENCY`.
//! A missing file is not an error; a malformed one is.

use super::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// sea-orm connection string
    pub database_url: String,
    /// ISO 4217 code used for display formatting
    pub currency: String,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            currency: "HKD".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Applies environment overrides. `lookup` is `std::env::var` in production.
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            self.database_url = url;
        }
        if let Some(currency) = lookup("LEDGER_CURRENCY").filter(|v| !v.trim().is_empty()) {
            self.currency = currency.trim().to_uppercase();
        }
        self
    }
}

/// Loads configuration from a TOML file, falling back to defaults if the file is absent.
///
/// # Errors
/// Returns [`Error::Config`] if the file exists but cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(AppConfig::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path.display()),
    })
}

/// Loads the file named by `LEDGER_CONFIG` (or `./config.toml`) and applies
/// environment overrides. Call after `dotenvy::dotenv()` so `.env` values count.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("LEDGER_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = load_config(&path)?.with_overrides(|key| std::env::var(key).ok());
    info!(
        config_path = %path,
        currency = %config.currency,
        "configuration loaded"
    );
    Ok(config)
}
