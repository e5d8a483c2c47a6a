//! The gateway to a MediaWiki API.
//!
//! [`Wiki`] is the single place requests are built and issued. Every request
//! goes through [`Wiki::request`], which adds the fixed protocol fields and
//! answers repeated requests from an in-memory [`ResultsCache`].
//!
//! `Wiki` is a cheap handle: clones share the transport and the cache.
//!
//! ```rust,no_run
//! use wikiq_core::{Wiki, WikiConfig};
//!
//! # async fn run() -> wikiq_core::Result<()> {
//! let config = WikiConfig { lang: "pt".to_string(), ..WikiConfig::default() };
//! let wiki = Wiki::from_config(config)?;
//!
//! let mut results = wiki.search("São Paulo", 10, 0).await?;
//! results.load_all().await?;
//! for page in &results {
//!     println!("{}: {}", page.label(), page.summary().unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::debug;

use crate::cache::{ResultsCache, fingerprint};
use crate::config::WikiConfig;
use crate::page::Page;
use crate::params::QueryParams;
use crate::response::ApiResponse;
use crate::results::ResultSet;
use crate::transport::{HttpTransport, Transport};
use crate::Result;

/// Default number of search hits.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Handle to a wiki API with a shared response cache.
#[derive(Clone)]
pub struct Wiki {
    inner: Arc<WikiInner>,
}

struct WikiInner {
    api_url: String,
    load_on_get: bool,
    transport: Arc<dyn Transport>,
    cache: Mutex<ResultsCache>,
}

impl Wiki {
    /// Gateway for the English Wikipedia over HTTP.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Gateway configured from `config`, over HTTP.
    pub fn from_config(config: WikiConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Start building a gateway.
    pub fn builder() -> WikiBuilder {
        WikiBuilder::default()
    }

    /// Resolved API endpoint.
    pub fn api_url(&self) -> &str {
        &self.inner.api_url
    }

    /// Whether `get_page` loads pages before returning them.
    pub fn load_on_get(&self) -> bool {
        self.inner.load_on_get
    }

    /// Send a query and return the parsed JSON body.
    ///
    /// Adds `format=json`, `formatversion=2` and `action=query` to `params`.
    /// A request whose complete parameter set was seen before is answered
    /// from the cache without touching the transport. Transport errors are
    /// returned unchanged.
    pub async fn request(&self, mut params: QueryParams) -> Result<Value> {
        params.set("format", "json");
        params.set("formatversion", "2");
        params.set("action", "query");

        let key = fingerprint(&params);
        let cached = self.cache().get(&key).map(ToString::to_string);
        if let Some(raw) = cached {
            debug!(fingerprint = %key, "Cache hit");
            return Ok(serde_json::from_str(&raw)?);
        }

        debug!(fingerprint = %key, "Cache miss: {}", params);
        let raw = self.inner.transport.get(&self.inner.api_url, &params).await?;
        let body = serde_json::from_str(&raw)?;
        self.cache().add(key, raw);
        Ok(body)
    }

    /// Full-text search. Returns unresolved pages in server order.
    pub async fn search(&self, query: &str, limit: u32, offset: u32) -> Result<ResultSet> {
        let params = QueryParams::new()
            .with("list", "search")
            .with("srsearch", query)
            .with("srlimit", limit)
            .with("sroffset", offset);

        let body = self.request(params).await?;
        let hits = ApiResponse::from_value(body)?.into_query()?.search;
        debug!("Search '{}' returned {} hits", query, hits.len());

        let pages = hits
            .into_iter()
            .map(|hit| Page::new(self, Some(hit.title), Some(hit.pageid)))
            .collect::<Result<Vec<_>>>()?;
        Ok(ResultSet::new(pages))
    }

    /// Page by title, loaded unless load-on-get is disabled.
    pub async fn get_page(&self, title: impl Into<String>) -> Result<Page> {
        self.get_page_with(Some(title.into()), None).await
    }

    /// Page by pageid, loaded unless load-on-get is disabled.
    pub async fn get_page_by_id(&self, pageid: u64) -> Result<Page> {
        self.get_page_with(None, Some(pageid)).await
    }

    /// Page by title and/or pageid, loaded unless load-on-get is disabled.
    pub async fn get_page_with(&self, title: Option<String>, pageid: Option<u64>) -> Result<Page> {
        let mut page = Page::new(self, title, pageid)?;
        if self.inner.load_on_get {
            page.load().await?;
        }
        Ok(page)
    }

    /// Number of cached responses.
    pub fn cache_len(&self) -> usize {
        self.cache().len()
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    fn cache(&self) -> MutexGuard<'_, ResultsCache> {
        self.inner
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Wiki {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wiki")
            .field("api_url", &self.inner.api_url)
            .field("load_on_get", &self.inner.load_on_get)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Wiki`].
///
/// Without an explicit transport an [`HttpTransport`] is created from the
/// config's timeout and user agent.
#[derive(Default)]
pub struct WikiBuilder {
    config: WikiConfig,
    transport: Option<Arc<dyn Transport>>,
    load_on_get: Option<bool>,
}

impl WikiBuilder {
    /// Use `config` for the API URL, language and HTTP settings.
    #[must_use]
    pub fn config(mut self, config: WikiConfig) -> Self {
        self.config = config;
        self
    }

    /// Send requests through `transport` instead of HTTP.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Override the config's load-on-get flag.
    #[must_use]
    pub const fn load_on_get(mut self, load: bool) -> Self {
        self.load_on_get = Some(load);
        self
    }

    /// Build the gateway.
    ///
    /// # Errors
    ///
    /// Fails when the API URL does not resolve to a valid URL or the HTTP
    /// client cannot be created.
    pub fn build(self) -> Result<Wiki> {
        let api_url = self.config.resolved_api_url()?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::with_options(
                self.config.timeout(),
                &self.config.user_agent,
            )?),
        };

        Ok(Wiki {
            inner: Arc::new(WikiInner {
                api_url,
                load_on_get: self.load_on_get.unwrap_or(self.config.load_on_get),
                transport,
                cache: Mutex::new(ResultsCache::new()),
            }),
        })
    }
}
