//! Collection entries and their record-store form

use chrono::{DateTime, Utc};
use gamecollect_catalog::{BarcodeMatch, GameDetail, Platform, SearchResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Record type name used in the record store
pub const RECORD_TYPE: &str = "Game";

/// Opaque handle of a record in the record store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A game in the user's collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Catalog id from the metadata API
    pub id: i64,
    pub title: String,
    pub date_added: DateTime<Utc>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    /// Set once the record store acknowledged a save
    #[serde(default)]
    pub record_id: Option<RecordId>,
}

impl Game {
    pub fn new(
        id: i64,
        title: impl Into<String>,
        date_added: DateTime<Utc>,
        platforms: Vec<Platform>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            date_added,
            platforms,
            record_id: None,
        }
    }

    pub fn from_search_result(result: &SearchResult, date_added: DateTime<Utc>) -> Self {
        Self::new(result.id, result.name.clone(), date_added, result.platforms.clone())
    }

    pub fn from_detail(detail: GameDetail, date_added: DateTime<Utc>) -> Self {
        Self::new(detail.id, detail.name, date_added, detail.platforms)
    }

    pub fn from_barcode_match(found: BarcodeMatch, date_added: DateTime<Utc>) -> Self {
        Self::new(found.id, found.title, date_added, found.platforms)
    }

    /// Fields mirrored to the record store
    pub fn to_record(&self) -> GameRecord {
        GameRecord {
            title: self.title.clone(),
            id: self.id,
            date_added: self.date_added,
        }
    }

    /// Rebuild from a stored record; platforms are not mirrored remotely
    pub fn from_stored(stored: StoredRecord) -> Self {
        Self {
            id: stored.record.id,
            title: stored.record.title,
            date_added: stored.record.date_added,
            platforms: Vec::new(),
            record_id: Some(stored.record_id),
        }
    }

    pub fn has_platform(&self, name: &str) -> bool {
        self.platforms.iter().any(|p| p.name == name)
    }
}

/// The `Game` record as kept by the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub title: String,
    pub id: i64,
    pub date_added: DateTime<Utc>,
}

/// A record together with its handle
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub record_id: RecordId,
    pub record: GameRecord,
}
