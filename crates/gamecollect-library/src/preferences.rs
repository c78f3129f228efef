//! Persisted user preferences

use crate::LibraryError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Catalog id of the game whose details were shown last
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_viewed_game: Option<i64>,
}

impl Preferences {
    /// Load preferences; a missing file gives defaults
    pub fn load(path: &Path) -> Result<Self, LibraryError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), LibraryError> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn last_viewed_game(&self) -> Option<i64> {
        self.last_viewed_game
    }

    pub fn set_last_viewed_game(&mut self, id: i64) {
        self.last_viewed_game = Some(id);
    }
}
