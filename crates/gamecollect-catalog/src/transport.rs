//! HTTP transport used by the API clients

use crate::CatalogError;
use async_trait::async_trait;
use gamecollect_config::CatalogConfig;
use std::time::Duration;

/// Minimal GET-only transport
///
/// Implementations return the body of a 2xx response. Anything else maps to
/// `CatalogError::Status`, and connection problems to `Network` or `Timeout`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<String, CatalogError>;
}

/// `reqwest`-backed transport
pub struct ReqwestTransport {
    client: reqwest::Client,
    request_timeout: Duration,
    resource_timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport with a connect timeout and a whole-request timeout
    pub fn new(request_timeout: Duration, resource_timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .connect_timeout(request_timeout)
            .timeout(resource_timeout)
            .user_agent(format!("GameCollect/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            request_timeout,
            resource_timeout,
        })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        Self::new(config.request_timeout(), config.resource_timeout())
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn resource_timeout(&self) -> Duration {
        self.resource_timeout
    }

    fn map_error(&self, err: reqwest::Error) -> CatalogError {
        if err.is_timeout() {
            self.timeout_error(err.is_connect())
        } else {
            CatalogError::Network(err.to_string())
        }
    }

    /// A connect timeout hit the request limit, anything later the resource limit
    fn timeout_error(&self, during_connect: bool) -> CatalogError {
        if during_connect {
            CatalogError::Timeout(self.request_timeout)
        } else {
            CatalogError::Timeout(self.resource_timeout)
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<String, CatalogError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        response.text().await.map_err(|e| self.map_error(e))
    }
}
