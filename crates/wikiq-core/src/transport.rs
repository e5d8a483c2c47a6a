//! HTTP transport used by the gateway.
//!
//! The gateway only needs one capability: issue a GET with query parameters
//! and hand back the raw body. [`Transport`] is that seam; [`HttpTransport`]
//! is the `reqwest` implementation used in production.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::params::QueryParams;
use crate::{Error, Result};

/// Issues GET requests against the wiki API.
///
/// Implementations return the raw response body. Failures are surfaced as
/// they are; the gateway does not translate or retry them.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform `GET url?params` and return the response body as text.
    async fn get(&self, url: &str, params: &QueryParams) -> Result<String>;
}

/// `reqwest`-backed transport with a request timeout and compression.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with a 30 second timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Creates a transport with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Self::with_options(timeout, default_user_agent())
    }

    /// Creates a transport with a custom timeout and user agent.
    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(Error::Network)?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, params: &QueryParams) -> Result<String> {
        let query: Vec<(&str, &str)> = params.iter().collect();
        let response = self.client.get(url).query(&query).send().await?;
        let status = response.status();
        debug!("GET {} -> {}", url, status);

        let response = response.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// User agent sent when none is configured.
#[must_use]
pub const fn default_user_agent() -> &'static str {
    concat!("wikiq/", env!("CARGO_PKG_VERSION"))
}
