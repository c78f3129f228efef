//! Integration tests for the catalog clients against a scripted transport

use async_trait::async_trait;
use gamecollect_catalog::{
    BarcodeResolver, CatalogError, HttpTransport, MetadataClient, SearchApplied, SearchSession,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// A scripted route: response body (or status) and how long to take
#[derive(Clone)]
struct Route {
    body: Result<String, u16>,
    delay: Duration,
}

/// Routes by URL, and for `/games` additionally by the `search` parameter
#[derive(Default)]
struct ScriptedTransport {
    routes: HashMap<String, Route>,
}

impl ScriptedTransport {
    fn route(mut self, key: &str, body: &str, delay_ms: u64) -> Self {
        self.routes.insert(
            key.to_string(),
            Route {
                body: Ok(body.to_string()),
                delay: Duration::from_millis(delay_ms),
            },
        );
        self
    }

    fn failing(mut self, key: &str, status: u16) -> Self {
        self.routes.insert(
            key.to_string(),
            Route {
                body: Err(status),
                delay: Duration::ZERO,
            },
        );
        self
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<String, CatalogError> {
        let search = query
            .iter()
            .find(|(k, _)| k == "search")
            .map(|(_, v)| v.as_str());
        let key = match search {
            Some(term) => format!("{}?search={}", url, term),
            None => url.to_string(),
        };

        let route = self
            .routes
            .get(&key)
            .cloned()
            .ok_or_else(|| CatalogError::Network(format!("no route for {}", key)))?;

        tokio::time::sleep(route.delay).await;
        route.body.map_err(CatalogError::Status)
    }
}

fn page(id: i64, name: &str) -> String {
    format!(
        r#"{{"count":1,"results":[{{"id":{},"name":"{}","metacritic":80,"platforms":[{{"platform":{{"id":4,"name":"PC"}}}}]}}]}}"#,
        id, name
    )
}

const CATALOG: &str = "http://catalog.test/api";
const UPC: &str = "http://upc.test";

#[tokio::test]
async fn test_overlapping_searches_keep_latest() {
    let transport = ScriptedTransport::default()
        .route(&format!("{}/games?search=mario", CATALOG), &page(1, "Super Mario"), 150)
        .route(&format!("{}/games?search=zelda", CATALOG), &page(2, "Zelda"), 10);
    let client = MetadataClient::new(Arc::new(transport), CATALOG, "k");
    let session = Arc::new(SearchSession::new(Arc::new(client)));

    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.search("mario", false, "").await })
    };
    // Let the first request get in flight before the second is issued
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = session.search("zelda", false, "").await;

    assert_eq!(second, SearchApplied::Applied);
    assert_eq!(first.await.unwrap(), SearchApplied::Stale);

    let shown = session.current();
    assert_eq!(shown.query.search, "zelda");
    assert_eq!(shown.page.results.len(), 1);
    assert_eq!(shown.page.results[0].id, 2);
    assert!(!session.is_loading());
}

#[tokio::test]
async fn test_overlapping_searches_in_order() {
    let transport = ScriptedTransport::default()
        .route(&format!("{}/games?search=mario", CATALOG), &page(1, "Super Mario"), 50)
        .route(&format!("{}/games?search=zelda", CATALOG), &page(2, "Zelda"), 100);
    let client = MetadataClient::new(Arc::new(transport), CATALOG, "k");
    let session = Arc::new(SearchSession::new(Arc::new(client)));

    let (first, second) = tokio::join!(
        session.search("mario", false, ""),
        session.search("zelda", false, "")
    );

    assert_eq!(first, SearchApplied::Stale);
    assert_eq!(second, SearchApplied::Applied);
    assert_eq!(session.current().page.results[0].name, "Zelda");
}

#[tokio::test]
async fn test_loading_flag_tracks_in_flight_search() {
    let transport = ScriptedTransport::default().route(
        &format!("{}/games?search=slow", CATALOG),
        &page(1, "Slow"),
        100,
    );
    let client = Arc::new(MetadataClient::new(Arc::new(transport), CATALOG, "k"));
    let session = Arc::new(SearchSession::new(client.clone()));

    let task = {
        let session = session.clone();
        tokio::spawn(async move { session.search("slow", false, "").await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(client.is_loading());

    task.await.unwrap();
    assert!(!client.is_loading());
}

fn barcode_setup(transport: ScriptedTransport, timeout: Duration) -> (BarcodeResolver, MetadataClient) {
    let transport = Arc::new(transport);
    let resolver = BarcodeResolver::new(transport.clone(), UPC, "upc-key", timeout);
    let client = MetadataClient::new(transport, CATALOG, "k");
    (resolver, client)
}

#[tokio::test]
async fn test_identify_barcode() {
    let transport = ScriptedTransport::default()
        .route(
            &format!("{}/v3/products", UPC),
            r#"{"products":[{"title":"Chrono Trigger"}]}"#,
            0,
        )
        .route(
            &format!("{}/games?search=Chrono-Trigger", CATALOG),
            &page(7, "Chrono Trigger"),
            0,
        )
        .route(
            &format!("{}/games/7", CATALOG),
            r#"{"platforms":[{"platform":{"id":79,"name":"SNES"}},{"platform":{"id":27,"name":"PlayStation"}}]}"#,
            0,
        );
    let (resolver, client) = barcode_setup(transport, Duration::from_secs(5));

    let found = resolver.identify("0123456789", &client).await.unwrap();
    assert_eq!(found.id, 7);
    assert_eq!(found.title, "Chrono Trigger");
    assert_eq!(found.product_title, "Chrono Trigger");
    let names: Vec<&str> = found.platforms.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["SNES", "PlayStation"]);
}

#[tokio::test]
async fn test_identify_falls_back_to_search_platforms() {
    let transport = ScriptedTransport::default()
        .route(
            &format!("{}/v3/products", UPC),
            r#"{"products":[{"title":"Doom"}]}"#,
            0,
        )
        .route(&format!("{}/games?search=Doom", CATALOG), &page(9, "DOOM"), 0)
        .failing(&format!("{}/games/9", CATALOG), 502);
    let (resolver, client) = barcode_setup(transport, Duration::from_secs(5));

    let found = resolver.identify("111", &client).await.unwrap();
    assert_eq!(found.id, 9);
    assert_eq!(found.platforms.len(), 1);
    assert_eq!(found.platforms[0].name, "PC");
}

#[tokio::test]
async fn test_identify_without_products_is_no_match() {
    let transport = ScriptedTransport::default().route(
        &format!("{}/v3/products", UPC),
        r#"{"products":[]}"#,
        0,
    );
    let (resolver, client) = barcode_setup(transport, Duration::from_secs(5));

    let err = resolver.identify("000", &client).await.unwrap_err();
    assert!(err.is_no_match());
}

#[tokio::test]
async fn test_identify_without_catalog_hit_is_no_match() {
    let transport = ScriptedTransport::default()
        .route(
            &format!("{}/v3/products", UPC),
            r#"{"products":[{"title":"Garden Hose"}]}"#,
            0,
        )
        .route(
            &format!("{}/games?search=Garden-Hose", CATALOG),
            r#"{"count":0,"results":[]}"#,
            0,
        );
    let (resolver, client) = barcode_setup(transport, Duration::from_secs(5));

    let err = resolver.identify("222", &client).await.unwrap_err();
    assert!(err.is_no_match());
}

#[tokio::test]
async fn test_identify_times_out() {
    let transport = ScriptedTransport::default().route(
        &format!("{}/v3/products", UPC),
        r#"{"products":[{"title":"Slowpoke"}]}"#,
        500,
    );
    let (resolver, client) = barcode_setup(transport, Duration::from_millis(50));

    let err = resolver.identify("333", &client).await.unwrap_err();
    assert!(matches!(err, CatalogError::Timeout(_)));
}
