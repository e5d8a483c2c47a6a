//! Blocking gateway.

use serde_json::Value;
use wikiq_core::loader::disambiguation_candidates;
use wikiq_core::{BatchLoader, QueryParams, Result, Wiki, WikiConfig};

use crate::driver::Driver;
use crate::page::BlockingPage;
use crate::results::BlockingResultSet;

/// Synchronous counterpart of [`Wiki`].
///
/// Clones share the underlying gateway, its cache and the runtime.
#[derive(Debug, Clone)]
pub struct BlockingWiki {
    wiki: Wiki,
    driver: Driver,
}

impl BlockingWiki {
    /// Blocking gateway for the English Wikipedia.
    pub fn new() -> Result<Self> {
        Self::from_wiki(Wiki::new()?)
    }

    /// Blocking gateway configured from `config`.
    pub fn from_config(config: WikiConfig) -> Result<Self> {
        Self::from_wiki(Wiki::from_config(config)?)
    }

    /// Wrap an existing async gateway.
    pub fn from_wiki(wiki: Wiki) -> Result<Self> {
        Ok(Self {
            wiki,
            driver: Driver::new()?,
        })
    }

    /// The wrapped async gateway.
    pub const fn as_async(&self) -> &Wiki {
        &self.wiki
    }

    /// Unwrap into the async gateway.
    pub fn into_async(self) -> Wiki {
        self.wiki
    }

    /// Resolved API endpoint.
    pub fn api_url(&self) -> &str {
        self.wiki.api_url()
    }

    /// Send a raw query.
    ///
    /// Stays async: batch and page loads call it from inside their own
    /// futures.
    pub async fn request(&self, params: QueryParams) -> Result<Value> {
        self.wiki.request(params).await
    }

    /// Full-text search. The returned pages are not loaded.
    pub fn search(&self, query: &str, limit: u32, offset: u32) -> Result<BlockingResultSet> {
        let results = self.driver.run(self.wiki.search(query, limit, offset))?;
        Ok(BlockingResultSet::new(results, self.driver.clone()))
    }

    /// Page by title, loaded unless load-on-get is disabled.
    pub fn get_page(&self, title: impl Into<String>) -> Result<BlockingPage> {
        self.get_page_with(Some(title.into()), None)
    }

    /// Page by pageid, loaded unless load-on-get is disabled.
    pub fn get_page_by_id(&self, pageid: u64) -> Result<BlockingPage> {
        self.get_page_with(None, Some(pageid))
    }

    /// Page by title and/or pageid, loaded unless load-on-get is disabled.
    pub fn get_page_with(
        &self,
        title: Option<String>,
        pageid: Option<u64>,
    ) -> Result<BlockingPage> {
        let page = self.driver.run(self.wiki.get_page_with(title, pageid))?;
        Ok(BlockingPage::new(page, self.driver.clone()))
    }

    /// Run a batch to completion and return its pages in server order.
    pub fn load_batch(&self, loader: BatchLoader) -> Result<Vec<BlockingPage>> {
        let pages = self.driver.run(loader.collect())?;
        Ok(pages
            .into_iter()
            .map(|page| BlockingPage::new(page, self.driver.clone()))
            .collect())
    }

    /// Titles linked from the disambiguation page `title`.
    pub fn disambiguation_candidates(&self, title: &str) -> Result<Vec<String>> {
        self.driver.run(disambiguation_candidates(&self.wiki, title))
    }

    /// Number of cached responses.
    pub fn cache_len(&self) -> usize {
        self.wiki.cache_len()
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        self.wiki.clear_cache();
    }
}
