//! Remote API settings

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Game-metadata API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL, without trailing slash
    #[serde(default = "default_catalog_url")]
    pub base_url: String,

    /// API key sent as the `key` query parameter
    #[serde(default)]
    pub api_key: String,

    /// Connect timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Whole-request timeout in seconds
    #[serde(default = "default_resource_timeout")]
    pub resource_timeout_secs: u64,
}

fn default_catalog_url() -> String {
    "https://api.rawg.io/api".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_resource_timeout() -> u64 {
    60
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_url(),
            api_key: String::new(),
            request_timeout_secs: default_request_timeout(),
            resource_timeout_secs: default_resource_timeout(),
        }
    }
}

impl CatalogConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn resource_timeout(&self) -> Duration {
        Duration::from_secs(self.resource_timeout_secs)
    }
}

/// Barcode lookup API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarcodeConfig {
    #[serde(default = "default_barcode_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    /// Upper bound for a complete barcode identification (lookup, search and detail)
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_secs: u64,
}

fn default_barcode_url() -> String {
    "https://api.barcodelookup.com".to_string()
}

fn default_lookup_timeout() -> u64 {
    20
}

impl Default for BarcodeConfig {
    fn default() -> Self {
        Self {
            base_url: default_barcode_url(),
            api_key: String::new(),
            lookup_timeout_secs: default_lookup_timeout(),
        }
    }
}

impl BarcodeConfig {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }
}
