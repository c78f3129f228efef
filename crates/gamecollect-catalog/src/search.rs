//! Search session: the results currently on display
//!
//! Every search gets a sequence number. A response is shown only if no newer
//! search was issued while it was in flight, so a slow early search can never
//! replace the results of a later one.

use crate::client::MetadataClient;
use crate::models::{MetacriticOrder, Platform, SearchResultPage};
use crate::query::{PlatformIndex, QueryParams, build_search_query};
use crate::CatalogError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::watch;

/// Results on display and the search that produced them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayedResults {
    /// Sequence number of the search; 0 before the first search
    pub sequence: u64,
    pub query: QueryParams,
    pub page: SearchResultPage,
}

/// What happened to a completed search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchApplied {
    /// Its results are on display
    Applied,
    /// A newer search was issued; the response was dropped
    Stale,
}

pub struct SearchSession {
    client: Arc<MetadataClient>,
    platforms: RwLock<PlatformIndex>,
    metacritic_order: Mutex<Option<MetacriticOrder>>,
    latest: AtomicU64,
    displayed: watch::Sender<DisplayedResults>,
}

impl SearchSession {
    pub fn new(client: Arc<MetadataClient>) -> Self {
        let (displayed, _) = watch::channel(DisplayedResults::default());
        Self {
            client,
            platforms: RwLock::new(PlatformIndex::new()),
            metacritic_order: Mutex::new(None),
            latest: AtomicU64::new(0),
            displayed,
        }
    }

    pub fn client(&self) -> &MetadataClient {
        &self.client
    }

    /// Fetch the platform list and use it for name lookups
    pub async fn load_platforms(&self) -> Result<Vec<Platform>, CatalogError> {
        let platforms = self.client.list_platforms().await?;
        self.set_platforms(&platforms);
        Ok(platforms)
    }

    pub fn set_platforms(&self, platforms: &[Platform]) {
        let index = PlatformIndex::from_platforms(platforms);
        match self.platforms.write() {
            Ok(mut guard) => *guard = index,
            Err(poisoned) => *poisoned.into_inner() = index,
        }
    }

    /// Build a query against the loaded platform list
    pub fn query(&self, term: &str, exact: bool, platform_name: &str) -> QueryParams {
        match self.platforms.read() {
            Ok(index) => build_search_query(term, exact, platform_name, &index),
            Err(poisoned) => build_search_query(term, exact, platform_name, &poisoned.into_inner()),
        }
    }

    /// Search from user input and display the response if still current
    pub async fn search(&self, term: &str, exact: bool, platform_name: &str) -> SearchApplied {
        let params = self.query(term, exact, platform_name);
        self.run(params).await
    }

    /// Run a prepared query and display the response if still current
    pub async fn run(&self, params: QueryParams) -> SearchApplied {
        let sequence = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        let mut page = self.client.search_games(&params).await.into_page();
        if let Some(order) = self.current_order() {
            page.sort_by_metacritic(order);
        }

        let mut pending = Some(DisplayedResults {
            sequence,
            query: params,
            page,
        });

        let applied = self.displayed.send_if_modified(|current| {
            let is_latest = self.latest.load(Ordering::SeqCst) == sequence;
            if !is_latest || current.sequence > sequence {
                return false;
            }
            match pending.take() {
                Some(next) => {
                    *current = next;
                    true
                }
                None => false,
            }
        });

        if applied {
            SearchApplied::Applied
        } else {
            tracing::debug!("Dropping stale search response #{}", sequence);
            SearchApplied::Stale
        }
    }

    /// Order displayed and future results by metacritic score, or stop ordering
    pub fn set_metacritic_order(&self, order: Option<MetacriticOrder>) {
        match self.metacritic_order.lock() {
            Ok(mut guard) => *guard = order,
            Err(poisoned) => *poisoned.into_inner() = order,
        }
        if let Some(order) = order {
            self.displayed
                .send_modify(|current| current.page.sort_by_metacritic(order));
        }
    }

    fn current_order(&self) -> Option<MetacriticOrder> {
        match self.metacritic_order.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Snapshot of what is on display
    pub fn current(&self) -> DisplayedResults {
        self.displayed.borrow().clone()
    }

    /// Observe the displayed results
    pub fn subscribe(&self) -> watch::Receiver<DisplayedResults> {
        self.displayed.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.client.is_loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpTransport;
    use async_trait::async_trait;

    struct FixedTransport(&'static str);

    #[async_trait]
    impl HttpTransport for FixedTransport {
        async fn get(&self, url: &str, _query: &[(String, String)]) -> Result<String, CatalogError> {
            if url.ends_with("/platforms") {
                Ok(r#"{"results":[{"id":4,"name":"PC"},{"id":7,"name":"Nintendo Switch"}]}"#.into())
            } else {
                Ok(self.0.to_string())
            }
        }
    }

    fn session(body: &'static str) -> SearchSession {
        let client = MetadataClient::new(Arc::new(FixedTransport(body)), "http://catalog.test", "k");
        SearchSession::new(Arc::new(client))
    }

    const PAGE: &str = r#"{"count":3,"results":[
        {"id":1,"name":"A","metacritic":60},
        {"id":2,"name":"B","metacritic":90},
        {"id":3,"name":"C"}]}"#;

    #[tokio::test]
    async fn test_search_displays_results() {
        let session = session(PAGE);
        let mut updates = session.subscribe();

        assert_eq!(session.search("a b", false, "").await, SearchApplied::Applied);
        assert!(updates.has_changed().unwrap());

        let shown = updates.borrow_and_update().clone();
        assert_eq!(shown.sequence, 1);
        assert_eq!(shown.query.search, "a-b");
        assert_eq!(shown.page.results.len(), 3);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_platform_names_resolve_after_load() {
        let session = session(PAGE);
        assert_eq!(session.query("x", false, "PC").platforms, None);

        let platforms = session.load_platforms().await.unwrap();
        assert!(platforms[0].is_no_selection());
        assert_eq!(session.query("x", false, "PC").platforms, Some(4));
        assert_eq!(session.query("x", false, "No selection").platforms, None);
    }

    #[tokio::test]
    async fn test_metacritic_order_applies_now_and_later() {
        let session = session(PAGE);
        session.search("", false, "").await;

        session.set_metacritic_order(Some(MetacriticOrder::Higher));
        let ids: Vec<i64> = session.current().page.results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);

        session.set_metacritic_order(Some(MetacriticOrder::Lower));
        session.search("again", false, "").await;
        let ids: Vec<i64> = session.current().page.results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_failed_search_shows_empty_page() {
        let session = session("not json");
        assert_eq!(session.search("zelda", false, "").await, SearchApplied::Applied);
        assert!(session.current().page.is_empty());
    }
}
