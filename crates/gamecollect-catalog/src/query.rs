//! Search query assembly
//!
//! The metadata API rejects literal spaces in query values, so free text and
//! platform names are hyphenated before they reach the transport.

use crate::models::{NO_SELECTION, Platform};
use std::collections::HashMap;

/// Replace every space with a hyphen
pub fn hyphenate(text: &str) -> String {
    text.replace(' ', "-")
}

/// Platform name to id lookup, built from the API's platform list
#[derive(Debug, Clone, Default)]
pub struct PlatformIndex {
    ids: HashMap<String, i64>,
}

impl PlatformIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a platform list; the "No selection" sentinel is skipped
    pub fn from_platforms<'a>(platforms: impl IntoIterator<Item = &'a Platform>) -> Self {
        let ids = platforms
            .into_iter()
            .filter(|p| !p.is_no_selection())
            .map(|p| (hyphenate(&p.name), p.id))
            .collect();
        Self { ids }
    }

    /// Resolve a display name or its hyphenated form
    pub fn resolve(&self, name: &str) -> Option<i64> {
        if name.is_empty() || name == NO_SELECTION {
            return None;
        }
        self.ids.get(&hyphenate(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Structured parameters for a game search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    /// Hyphenated search text, possibly empty
    pub search: String,
    pub search_exact: bool,
    /// Platform filter; `None` searches every platform
    pub platforms: Option<i64>,
}

impl QueryParams {
    /// Query pairs for `GET /games`, key first
    pub fn to_pairs(&self, api_key: &str) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("key".to_string(), api_key.to_string()),
            ("search".to_string(), self.search.clone()),
            ("search_exact".to_string(), self.search_exact.to_string()),
        ];
        if let Some(platform) = self.platforms {
            pairs.push(("platforms".to_string(), platform.to_string()));
        }
        pairs
    }
}

/// Build search parameters from user input
///
/// An unknown platform name (or the "No selection" sentinel) drops the
/// platform filter instead of failing. Empty `term` is allowed; whether to
/// fire such a request is the caller's call.
pub fn build_search_query(
    term: &str,
    exact: bool,
    platform_name: &str,
    platforms: &PlatformIndex,
) -> QueryParams {
    let platform_filter = platforms.resolve(platform_name);
    if platform_filter.is_none() && !platform_name.is_empty() && platform_name != NO_SELECTION {
        tracing::debug!("Unknown platform {:?}, searching all platforms", platform_name);
    }

    QueryParams {
        search: hyphenate(term),
        search_exact: exact,
        platforms: platform_filter,
    }
}
