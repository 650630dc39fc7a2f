//! Main application configuration
//!
//! This module defines the primary configuration structures for the rating
//! ledger, including environment variable and TOML file loading and validation.

use crate::config::rating::RatingSettings;
use crate::config::storage::{StorageBackend, StorageSettings};
use crate::ledger::MatchLedger;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub storage: StorageSettings,
    pub rating: RatingSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "rating-ledger".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from a TOML file; missing keys take defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Build configuration from an arbitrary key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        // Service settings
        if let Some(name) = lookup("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Some(log_level) = lookup("LOG_LEVEL") {
            config.service.log_level = log_level;
        }

        // Storage settings
        if let Some(backend) = lookup("STORAGE_BACKEND") {
            config.storage.backend = backend
                .parse::<StorageBackend>()
                .map_err(|e| anyhow!("Invalid STORAGE_BACKEND value: {}", e))?;
        }
        if let Some(path) = lookup("DATABASE_PATH") {
            config.storage.database_path = path.into();
        }

        // Rating settings
        if let Some(k) = lookup("RATING_K_FACTOR") {
            config.rating.k_factor = k
                .parse()
                .map_err(|_| anyhow!("Invalid RATING_K_FACTOR value: {}", k))?;
        }
        if let Some(initial) = lookup("RATING_INITIAL") {
            config.rating.initial_rating = initial
                .parse()
                .map_err(|_| anyhow!("Invalid RATING_INITIAL value: {}", initial))?;
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Open storage and the match ledger described by this configuration
    pub fn open_ledger(&self) -> Result<MatchLedger> {
        let storage = self.storage.open()?;
        let calculator = self.rating.calculator()?;
        let ledger = MatchLedger::with_calculator(storage, calculator)
            .context("Failed to open match ledger")?;
        Ok(ledger)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate storage settings
    if config.storage.backend == StorageBackend::Sqlite
        && config.storage.database_path.as_os_str().is_empty()
    {
        return Err(anyhow!("Database path cannot be empty"));
    }

    // Validate rating settings
    config.rating.to_elo_settings().validate()?;

    Ok(())
}
