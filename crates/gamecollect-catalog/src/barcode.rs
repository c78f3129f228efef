//! Barcode lookup and catalog matching

use crate::client::{MetadataClient, SearchOutcome};
use crate::models::{BarcodeResponse, Platform};
use crate::query::{PlatformIndex, build_search_query};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::CatalogError;
use gamecollect_config::{BarcodeConfig, CatalogConfig};
use std::sync::Arc;
use std::time::Duration;

/// Catalog game identified from a scanned barcode, awaiting confirmation
#[derive(Debug, Clone, PartialEq)]
pub struct BarcodeMatch {
    pub upc: String,
    /// Retail title returned by the barcode API
    pub product_title: String,
    /// Catalog id of the first search hit
    pub id: i64,
    /// Catalog name of the first search hit
    pub title: String,
    pub platforms: Vec<Platform>,
}

/// Resolves UPC codes through the barcode API
pub struct BarcodeResolver {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: String,
    lookup_timeout: Duration,
}

impl BarcodeResolver {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        lookup_timeout: Duration,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            lookup_timeout,
        }
    }

    /// Create a resolver whose HTTP calls use the catalog's request and
    /// resource timeouts; `lookup_timeout` bounds the whole identify chain
    pub fn from_config(
        config: &BarcodeConfig,
        catalog: &CatalogConfig,
    ) -> Result<Self, CatalogError> {
        let transport = ReqwestTransport::from_config(catalog)?;
        Ok(Self::new(
            Arc::new(transport),
            config.base_url.clone(),
            config.api_key.clone(),
            config.lookup_timeout(),
        ))
    }

    pub fn lookup_timeout(&self) -> Duration {
        self.lookup_timeout
    }

    /// Look up the retail product title for a UPC
    pub async fn resolve_barcode(&self, upc: &str) -> Result<String, CatalogError> {
        let upc = upc.trim();
        if upc.is_empty() {
            return Err(CatalogError::NoMatch("no barcode scanned".into()));
        }

        let url = format!("{}/v3/products", self.base_url);
        let query = vec![
            ("barcode".to_string(), upc.to_string()),
            ("formatted".to_string(), "y".to_string()),
            ("key".to_string(), self.api_key.clone()),
        ];

        let body = self.transport.get(&url, &query).await?;
        let response: BarcodeResponse = serde_json::from_str(&body)?;

        let product = response
            .products
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::NoMatch(format!("no product for barcode {}", upc)))?;

        tracing::debug!("Barcode {} resolved to {:?}", upc, product.title);
        Ok(product.title)
    }

    /// Resolve a barcode to a catalog game, bounded by the lookup timeout
    pub async fn identify(
        &self,
        upc: &str,
        client: &MetadataClient,
    ) -> Result<BarcodeMatch, CatalogError> {
        tokio::time::timeout(self.lookup_timeout, self.identify_inner(upc, client))
            .await
            .map_err(|_| {
                tracing::warn!("Barcode lookup for {} timed out", upc);
                CatalogError::Timeout(self.lookup_timeout)
            })?
    }

    async fn identify_inner(
        &self,
        upc: &str,
        client: &MetadataClient,
    ) -> Result<BarcodeMatch, CatalogError> {
        let product_title = self.resolve_barcode(upc).await?;

        let params = build_search_query(&product_title, false, "", &PlatformIndex::new());
        let hit = match client.search_games(&params).await {
            SearchOutcome::Found(page) => page.results.into_iter().next(),
            SearchOutcome::Empty => None,
            SearchOutcome::Failed(err) => return Err(err),
        }
        .ok_or_else(|| CatalogError::NoMatch(format!("no catalog game for {:?}", product_title)))?;

        let platforms = match client.game_detail(hit.id).await {
            Ok(detail) => detail.platforms,
            Err(e) => {
                tracing::warn!(
                    "Detail lookup for game {} failed, using search platforms: {}",
                    hit.id,
                    e
                );
                hit.platforms
            }
        };

        Ok(BarcodeMatch {
            upc: upc.trim().to_string(),
            product_title,
            id: hit.id,
            title: hit.name,
            platforms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct ProductsTransport(&'static str);

    #[async_trait]
    impl HttpTransport for ProductsTransport {
        async fn get(&self, url: &str, query: &[(String, String)]) -> Result<String, CatalogError> {
            assert!(url.ends_with("/v3/products"));
            assert!(query.contains(&("formatted".to_string(), "y".to_string())));
            Ok(self.0.to_string())
        }
    }

    fn resolver(body: &'static str) -> BarcodeResolver {
        BarcodeResolver::new(
            Arc::new(ProductsTransport(body)),
            "http://upc.test/",
            "k",
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_from_config_keeps_lookup_limit() {
        let barcode = BarcodeConfig {
            lookup_timeout_secs: 12,
            ..BarcodeConfig::default()
        };
        let resolver = BarcodeResolver::from_config(&barcode, &CatalogConfig::default()).unwrap();
        assert_eq!(resolver.lookup_timeout(), Duration::from_secs(12));
        assert_eq!(resolver.base_url, "https://api.barcodelookup.com");
    }

    #[tokio::test]
    async fn test_resolve_first_product() {
        let resolver = resolver(r#"{"products":[{"title":"Chrono Trigger"},{"title":"Other"}]}"#);
        let title = resolver.resolve_barcode("0123456789").await.unwrap();
        assert_eq!(title, "Chrono Trigger");
    }

    #[tokio::test]
    async fn test_empty_products_is_no_match() {
        let resolver = resolver(r#"{"products":[]}"#);
        let err = resolver.resolve_barcode("0123456789").await.unwrap_err();
        assert!(err.is_no_match());
    }

    #[tokio::test]
    async fn test_blank_barcode_is_no_match() {
        let resolver = resolver(r#"{"products":[{"title":"unused"}]}"#);
        let err = resolver.resolve_barcode("   ").await.unwrap_err();
        assert!(err.is_no_match());
    }

    #[tokio::test]
    async fn test_malformed_response_is_decode_error() {
        let resolver = resolver("<html>");
        let err = resolver.resolve_barcode("0123456789").await.unwrap_err();
        assert!(err.is_decode());
    }
}
