//! On-device copy of the collection

use crate::game::Game;
use crate::LibraryError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    saved_at: DateTime<Utc>,
    games: Vec<Game>,
}

/// JSON snapshot file, rewritten after every collection change
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the collection; the previous snapshot stays intact until the new one is complete
    pub fn save(&self, games: &[Game]) -> Result<(), LibraryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let snapshot = Snapshot {
            saved_at: Utc::now(),
            games: games.to_vec(),
        };
        let contents = serde_json::to_vec_pretty(&snapshot)?;

        let partial_path = self.path.with_extension("partial");
        fs::write(&partial_path, contents)?;
        fs::rename(&partial_path, &self.path)?;

        tracing::debug!("Saved {} games to {}", games.len(), self.path.display());
        Ok(())
    }

    /// Read the collection; a missing file is an empty collection
    pub fn load(&self) -> Result<Vec<Game>, LibraryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read(&self.path)?;
        let snapshot: Snapshot = serde_json::from_slice(&contents)?;
        Ok(snapshot.games)
    }
}
