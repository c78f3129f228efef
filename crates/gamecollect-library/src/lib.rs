//! Game collection management for GameCollect
//!
//! Holds the user's collection in memory, mirrors every change to a record
//! store, and keeps a local snapshot file as a fallback copy.

mod collection;
mod game;
mod preferences;
mod records;
mod snapshot;
mod sqlite;
mod store;
mod sync;

pub use collection::{GameCollection, SyncStatus};
pub use game::{Game, GameRecord, RECORD_TYPE, RecordId, StoredRecord};
pub use preferences::Preferences;
pub use records::{InMemoryRecordStore, RecordStore};
pub use snapshot::SnapshotFile;
pub use sqlite::SqliteRecordStore;
pub use store::{CollectionEvent, CollectionStore, SortKey};
pub use sync::{BulkDeleteReport, CloudSync};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Record store error: {0}")]
    RemoteSync(String),

    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("Game {0} has no remote record")]
    MissingRecordId(i64),

    #[error("Index {index} out of range for collection of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl LibraryError {
    /// Failure reported by, or on the way to, the record store
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            LibraryError::RemoteSync(_)
                | LibraryError::RecordNotFound(_)
                | LibraryError::MissingRecordId(_)
                | LibraryError::InvalidRecord(_)
                | LibraryError::Sqlite(_)
        )
    }
}
