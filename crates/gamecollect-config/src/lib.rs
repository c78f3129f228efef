//! Configuration management for GameCollect
//!
//! Handles remote API endpoints and keys, request timeouts, and the local
//! storage layout. Configuration is a TOML file, optionally overlaid with
//! `GAMECOLLECT__SECTION__KEY` environment variables.

mod api_config;
mod storage_config;

pub use api_config::{BarcodeConfig, CatalogConfig};
pub use storage_config::StorageConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Layered configuration error: {0}")]
    Layered(#[from] config::ConfigError),
}

/// Name of the configuration file inside the data directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Prefix for environment overrides, e.g. `GAMECOLLECT__CATALOG__API_KEY`
pub const ENV_PREFIX: &str = "GAMECOLLECT";

/// Main GameCollect configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub barcode: BarcodeConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl CollectConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load an optional file, then apply environment overrides
    pub fn load_layered(path: &Path) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default location
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if !path.exists() {
            tracing::warn!(
                "No configuration file at {}, using defaults and environment",
                path.display()
            );
        }
        Self::load_layered(&path)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject settings the clients cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("catalog.base_url is empty".into()));
        }
        if self.barcode.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("barcode.base_url is empty".into()));
        }
        if self.catalog.request_timeout_secs == 0 || self.catalog.resource_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "catalog timeouts must be non-zero".into(),
            ));
        }
        if self.catalog.request_timeout_secs > self.catalog.resource_timeout_secs {
            return Err(ConfigError::Invalid(format!(
                "catalog.request_timeout_secs ({}) exceeds resource_timeout_secs ({})",
                self.catalog.request_timeout_secs, self.catalog.resource_timeout_secs
            )));
        }
        if self.barcode.lookup_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "barcode.lookup_timeout_secs must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Default configuration file path
pub fn default_config_path() -> PathBuf {
    StorageConfig::default().data_dir.join(CONFIG_FILE_NAME)
}
