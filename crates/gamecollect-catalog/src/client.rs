//! Game-metadata API client

use crate::models::{GameDetail, Platform, PlatformListResponse, SearchResult, SearchResultPage};
use crate::query::QueryParams;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::CatalogError;
use gamecollect_config::CatalogConfig;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::watch;

/// Result of a game search
///
/// Callers showing results to a user go through [`SearchOutcome::into_page`],
/// which turns every failure into an empty page. The variants keep the
/// distinction for everyone else.
#[derive(Debug)]
pub enum SearchOutcome {
    Found(SearchResultPage),
    Empty,
    Failed(CatalogError),
}

impl SearchOutcome {
    /// Page to display; failures show as no results
    pub fn into_page(self) -> SearchResultPage {
        match self {
            SearchOutcome::Found(page) => page,
            SearchOutcome::Empty | SearchOutcome::Failed(_) => SearchResultPage::default(),
        }
    }

    pub fn results(&self) -> &[SearchResult] {
        match self {
            SearchOutcome::Found(page) => &page.results,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&CatalogError> {
        match self {
            SearchOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SearchOutcome::Failed(_))
    }
}

/// Keeps the loading flag raised while alive
pub struct LoadingGuard<'a> {
    client: &'a MetadataClient,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.client.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.client.loading.send_replace(false);
        }
    }
}

/// Client for the search, detail and platform endpoints
pub struct MetadataClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: String,
    loading: watch::Sender<bool>,
    in_flight: AtomicUsize,
}

impl MetadataClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        let (loading, _) = watch::channel(false);

        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            loading,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Create a client with a `reqwest` transport
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let transport = ReqwestTransport::from_config(config)?;
        Ok(Self::new(
            Arc::new(transport),
            config.base_url.clone(),
            config.api_key.clone(),
        ))
    }

    /// Whether any search is in flight
    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Observe the loading flag
    pub fn loading_updates(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// Raise the loading flag until the guard is dropped
    pub fn begin_loading(&self) -> LoadingGuard<'_> {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) == 0 {
            self.loading.send_replace(true);
        }
        LoadingGuard { client: self }
    }

    /// Search games (`GET /games`)
    pub async fn search_games(&self, params: &QueryParams) -> SearchOutcome {
        let _loading = self.begin_loading();
        let url = format!("{}/games", self.base_url);

        match self
            .fetch::<SearchResultPage>(&url, params.to_pairs(&self.api_key))
            .await
        {
            Ok(page) if page.is_empty() => SearchOutcome::Empty,
            Ok(page) => {
                tracing::debug!(
                    "Search {:?} returned {} of {} results",
                    params.search,
                    page.results.len(),
                    page.count
                );
                SearchOutcome::Found(page)
            }
            Err(e) => {
                tracing::warn!("Search {:?} failed: {}", params.search, e);
                SearchOutcome::Failed(e)
            }
        }
    }

    /// Fetch a game's details (`GET /games/{id}`)
    pub async fn game_detail(&self, id: i64) -> Result<GameDetail, CatalogError> {
        let url = format!("{}/games/{}", self.base_url, id);
        let mut detail: GameDetail = self.fetch(&url, self.key_pair()).await?;
        if detail.id == 0 {
            detail.id = id;
        }
        Ok(detail)
    }

    /// List supported platforms sorted by name, "No selection" first
    pub async fn list_platforms(&self) -> Result<Vec<Platform>, CatalogError> {
        let url = format!("{}/platforms", self.base_url);
        let response: PlatformListResponse = self.fetch(&url, self.key_pair()).await?;

        let mut platforms = response.results;
        platforms.sort_by(|a, b| a.name.cmp(&b.name));
        platforms.insert(0, Platform::no_selection());

        tracing::debug!("Loaded {} platforms", platforms.len() - 1);
        Ok(platforms)
    }

    fn key_pair(&self) -> Vec<(String, String)> {
        vec![("key".to_string(), self.api_key.clone())]
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, CatalogError> {
        let body = self.transport.get(url, &query).await?;
        Ok(serde_json::from_str(&body)?)
    }
}
