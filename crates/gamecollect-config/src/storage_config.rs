//! Local storage locations

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where collection data lives on this device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding every file below
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// JSON snapshot of the collection, rewritten after each change
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,

    /// SQLite database backing the record store
    #[serde(default = "default_records_db")]
    pub records_db: String,

    /// User preferences (last viewed game)
    #[serde(default = "default_preferences_file")]
    pub preferences_file: String,
}

fn default_data_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".gamecollect")
}

fn default_snapshot_file() -> String {
    "collection.json".to_string()
}

fn default_records_db() -> String {
    "records.db".to_string()
}

fn default_preferences_file() -> String {
    "preferences.toml".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            snapshot_file: default_snapshot_file(),
            records_db: default_records_db(),
            preferences_file: default_preferences_file(),
        }
    }
}

impl StorageConfig {
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.snapshot_file)
    }

    pub fn records_db_path(&self) -> PathBuf {
        self.data_dir.join(&self.records_db)
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join(&self.preferences_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_join_data_dir() {
        let config = StorageConfig {
            data_dir: PathBuf::from("/tmp/gc"),
            ..Default::default()
        };
        assert_eq!(config.snapshot_path(), PathBuf::from("/tmp/gc/collection.json"));
        assert_eq!(config.records_db_path(), PathBuf::from("/tmp/gc/records.db"));
        assert_eq!(
            config.preferences_path(),
            PathBuf::from("/tmp/gc/preferences.toml")
        );
    }
}
