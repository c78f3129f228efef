//! Catalog data types and their wire shapes

use serde::{Deserialize, Deserializer, Serialize};

/// Display name of the "no platform filter" choice
pub const NO_SELECTION: &str = "No selection";

/// A gaming platform as listed by the metadata API
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    pub id: i64,
    pub name: String,
}

impl Platform {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Sentinel placed first in the platform list, meaning "no filter"
    pub fn no_selection() -> Self {
        Self::new(0, NO_SELECTION)
    }

    pub fn is_no_selection(&self) -> bool {
        self.id == 0 && self.name == NO_SELECTION
    }
}

/// Game payloads nest each platform as `{"platform": {...}}`
#[derive(Deserialize)]
struct PlatformEntry {
    platform: Platform,
}

/// Accepts a missing or `null` list as empty
fn nested_platforms<'de, D>(deserializer: D) -> Result<Vec<Platform>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<PlatformEntry>>::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(|entry| entry.platform)
        .collect())
}

/// One game in a search response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResult {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub metacritic: Option<i32>,
    #[serde(default, deserialize_with = "nested_platforms")]
    pub platforms: Vec<Platform>,
}

impl SearchResult {
    /// Platform names joined for a result row, e.g. "PC, Nintendo Switch"
    pub fn platform_summary(&self) -> String {
        self.platforms
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Direction for ordering results by metacritic score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetacriticOrder {
    /// Best scores first
    Higher,
    /// Worst scores first
    Lower,
}

/// A decoded search response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResultPage {
    pub count: u64,
    pub results: Vec<SearchResult>,
}

impl SearchResultPage {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn first(&self) -> Option<&SearchResult> {
        self.results.first()
    }

    /// Reorder results by score; unscored games count as the lowest score
    pub fn sort_by_metacritic(&mut self, order: MetacriticOrder) {
        match order {
            MetacriticOrder::Higher => self
                .results
                .sort_by(|a, b| b.metacritic.cmp(&a.metacritic)),
            MetacriticOrder::Lower => self
                .results
                .sort_by(|a, b| a.metacritic.cmp(&b.metacritic)),
        }
    }
}

/// Detail response for a single game
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GameDetail {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "nested_platforms")]
    pub platforms: Vec<Platform>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlatformListResponse {
    pub results: Vec<Platform>,
}

/// A retail product returned by the barcode API
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BarcodeProduct {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BarcodeResponse {
    #[serde(default)]
    pub products: Vec<BarcodeProduct>,
}
