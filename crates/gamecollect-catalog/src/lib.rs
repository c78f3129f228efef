//! Game catalog clients for GameCollect
//!
//! Talks to the game-metadata API (search, detail, platform list) and the
//! barcode lookup API, and keeps the displayed search results consistent when
//! several searches overlap.

mod barcode;
mod client;
mod models;
mod query;
mod search;
mod transport;

pub use barcode::{BarcodeMatch, BarcodeResolver};
pub use client::{LoadingGuard, MetadataClient, SearchOutcome};
pub use models::{
    BarcodeProduct, GameDetail, MetacriticOrder, NO_SELECTION, Platform, SearchResult,
    SearchResultPage,
};
pub use query::{PlatformIndex, QueryParams, build_search_query, hyphenate};
pub use search::{DisplayedResults, SearchApplied, SearchSession};
pub use transport::{HttpTransport, ReqwestTransport};

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server returned status {0}")]
    Status(u16),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No match: {0}")]
    NoMatch(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl CatalogError {
    /// Transport-level failure (unreachable, timeout, non-2xx)
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            CatalogError::Network(_)
                | CatalogError::Status(_)
                | CatalogError::Timeout(_)
                | CatalogError::Http(_)
        )
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, CatalogError::Decode(_))
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, CatalogError::NoMatch(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_taxonomy() {
        assert!(CatalogError::Network("refused".into()).is_network());
        assert!(CatalogError::Status(503).is_network());
        assert!(CatalogError::Timeout(Duration::from_secs(1)).is_network());
        assert!(CatalogError::NoMatch("upc".into()).is_no_match());

        let decode = serde_json::from_str::<SearchResultPage>("{").unwrap_err();
        let err = CatalogError::from(decode);
        assert!(err.is_decode());
        assert!(!err.is_network());
    }

    #[test]
    fn test_error_display() {
        let err = CatalogError::Status(404);
        assert_eq!(format!("{}", err), "Server returned status 404");
    }
}
