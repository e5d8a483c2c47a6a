//! A single wiki article and its loaded metadata.
//!
//! A [`Page`] starts out with only an identifier (title, pageid or both) and
//! is filled in by [`Page::load`], which runs a one-element
//! [`BatchLoader`] and merges the result. Pages produced by a batch load are
//! complete from the start.
//!
//! ```rust,no_run
//! use wikiq_core::{Page, Wiki};
//!
//! # async fn run() -> wikiq_core::Result<()> {
//! let wiki = Wiki::new()?;
//! let mut page = Page::with_title(&wiki, "Rust (programming language)");
//! page.load().await?;
//! println!("{}", page.summary().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use std::fmt;

use futures::StreamExt;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::loader::BatchLoader;
use crate::response::{RawCoordinate, RawPage};
use crate::wiki::Wiki;
use crate::{Error, Result};

/// What a load fetches. Only the basic API information exists today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadType {
    /// Summary, url, links, redirects, references, categories, coordinates.
    #[default]
    Basic,
}

/// Exact latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: Decimal,
    /// Longitude in degrees.
    pub longitude: Decimal,
}

impl Coordinates {
    /// Take the first entry of a coordinate list; `None` when empty.
    pub fn from_entries(entries: &[RawCoordinate]) -> Option<Self> {
        entries.first().map(|c| Self {
            latitude: c.lat,
            longitude: c.lon,
        })
    }
}

/// One wiki article.
#[derive(Clone, Serialize)]
pub struct Page {
    #[serde(skip)]
    wiki: Wiki,
    title: Option<String>,
    pageid: Option<u64>,
    summary: Option<String>,
    url: Option<String>,
    redirected: bool,
    links: Vec<String>,
    redirects: Vec<String>,
    references: Vec<String>,
    categories: Vec<String>,
    coordinates: Option<Coordinates>,
    loaded: bool,
}

impl Page {
    /// Create an unloaded page from a title, a pageid or both.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingIdentifier`] when both are `None`.
    pub fn new(wiki: &Wiki, title: Option<String>, pageid: Option<u64>) -> Result<Self> {
        if title.is_none() && pageid.is_none() {
            return Err(Error::MissingIdentifier(
                "a page needs a title or a pageid".to_string(),
            ));
        }
        Ok(Self::empty(wiki, title, pageid))
    }

    /// Create an unloaded page from a title.
    pub fn with_title(wiki: &Wiki, title: impl Into<String>) -> Self {
        Self::empty(wiki, Some(title.into()), None)
    }

    /// Create an unloaded page from a pageid.
    pub fn with_pageid(wiki: &Wiki, pageid: u64) -> Self {
        Self::empty(wiki, None, Some(pageid))
    }

    fn empty(wiki: &Wiki, title: Option<String>, pageid: Option<u64>) -> Self {
        Self {
            wiki: wiki.clone(),
            title,
            pageid,
            summary: None,
            url: None,
            redirected: false,
            links: Vec::new(),
            redirects: Vec::new(),
            references: Vec::new(),
            categories: Vec::new(),
            coordinates: None,
            loaded: false,
        }
    }

    /// Build a fully populated page from a server page entry.
    ///
    /// `redirected` tells whether the entry was reached through a redirect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] when the entry has no pageid or title.
    pub fn from_api_result(wiki: &Wiki, raw: RawPage, redirected: bool) -> Result<Self> {
        let (Some(pageid), Some(title)) = (raw.pageid, raw.title) else {
            return Err(Error::Parse(
                "page entry is missing its pageid or title".to_string(),
            ));
        };

        Ok(Self {
            wiki: wiki.clone(),
            title: Some(title),
            pageid: Some(pageid),
            summary: raw.extract,
            url: raw.fullurl,
            redirected,
            links: raw.links.into_iter().map(|l| l.title).collect(),
            redirects: raw.redirects.into_iter().map(|r| r.title).collect(),
            references: raw.extlinks.into_iter().map(|e| e.url).collect(),
            categories: raw
                .categories
                .into_iter()
                .map(|c| strip_namespace(&c.title).to_string())
                .collect(),
            coordinates: Coordinates::from_entries(&raw.coordinates),
            loaded: true,
        })
    }

    /// Page title; may change after a load that followed a redirect.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Page id.
    pub const fn pageid(&self) -> Option<u64> {
        self.pageid
    }

    /// Plain-text introduction.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Canonical page URL.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Whether the load followed a redirect to reach this page.
    pub const fn redirected(&self) -> bool {
        self.redirected
    }

    /// Titles of linked articles.
    pub fn links(&self) -> &[String] {
        &self.links
    }

    /// Titles of pages redirecting here.
    pub fn redirects(&self) -> &[String] {
        &self.redirects
    }

    /// External link URLs.
    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// Category names without the namespace prefix.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Location, when the page has one.
    pub const fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    /// Whether the page holds server data.
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Gateway this page loads through.
    pub const fn wiki(&self) -> &Wiki {
        &self.wiki
    }

    /// Title, or the pageid when the title is unknown.
    pub fn label(&self) -> String {
        match (&self.title, self.pageid) {
            (Some(title), _) => title.clone(),
            (None, Some(id)) => id.to_string(),
            (None, None) => String::new(),
        }
    }

    /// Fetch the page with the default load type.
    pub async fn load(&mut self) -> Result<()> {
        self.load_as(LoadType::default()).await
    }

    /// Fetch the page and merge the result into `self`.
    ///
    /// Looks the page up by pageid when known, by title otherwise. Whatever
    /// error the lookup produced is returned unchanged.
    pub async fn load_as(&mut self, load_type: LoadType) -> Result<()> {
        match load_type {
            LoadType::Basic => self.basic_load().await,
        }
    }

    async fn basic_load(&mut self) -> Result<()> {
        let loader = match (self.pageid, &self.title) {
            (Some(pageid), _) => BatchLoader::for_pageids(&self.wiki, [pageid])?,
            (None, Some(title)) => BatchLoader::for_titles(&self.wiki, [title.clone()])?,
            (None, None) => {
                return Err(Error::MissingIdentifier(
                    "a page needs a title or a pageid".to_string(),
                ));
            },
        };

        let mut pages = loader.load().await?;
        match pages.next().await {
            Some(Ok(page)) => self.merge(page),
            Some(Err(err)) => Err(err),
            None => Err(Error::MissingPage(self.label())),
        }
    }

    /// Copy every field of `other` into `self`, identifiers included.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPage`] when both pages have a pageid and they
    /// differ; `self` is left untouched in that case.
    pub fn merge(&mut self, other: Self) -> Result<()> {
        if let (Some(expected), Some(found)) = (self.pageid, other.pageid) {
            if expected != found {
                return Err(Error::InvalidPage { expected, found });
            }
        }

        self.title = other.title;
        self.pageid = other.pageid;
        self.summary = other.summary;
        self.url = other.url;
        self.redirected = other.redirected;
        self.links = other.links;
        self.redirects = other.redirects;
        self.references = other.references;
        self.categories = other.categories;
        self.coordinates = other.coordinates;
        self.loaded = other.loaded;
        Ok(())
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("title", &self.title)
            .field("pageid", &self.pageid)
            .field("loaded", &self.loaded)
            .field("redirected", &self.redirected)
            .finish_non_exhaustive()
    }
}

/// `Category:Foo` → `Foo`. Titles without a namespace are returned as-is.
fn strip_namespace(title: &str) -> &str {
    title.split_once(':').map_or(title, |(_, name)| name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use serde_json::json;
    use std::str::FromStr;
    use std::sync::Arc;

    fn offline_wiki() -> Wiki {
        Wiki::builder()
            .transport(Arc::new(ScriptedTransport::new()))
            .build()
            .unwrap()
    }

    fn loaded_page(wiki: &Wiki, pageid: u64, title: &str) -> Page {
        let raw: RawPage = serde_json::from_value(json!({
            "pageid": pageid,
            "title": title,
            "fullurl": "http://bla.nada",
            "extract": "some summary",
            "links": [{"ns": 0, "title": "Linked"}],
            "redirects": [{"title": "some-redir"}],
            "categories": [{"title": "Category:Some Category"}],
            "extlinks": [{"url": "some.url"}],
            "coordinates": [{"lat": 12.232, "lon": 23.234}]
        }))
        .unwrap();
        Page::from_api_result(wiki, raw, false).unwrap()
    }

    #[test]
    fn test_new_without_identifier_fails() {
        let wiki = offline_wiki();
        let result = Page::new(&wiki, None, None);

        assert!(matches!(result, Err(Error::MissingIdentifier(_))));
    }

    #[test]
    fn test_new_with_both_identifiers() {
        let wiki = offline_wiki();
        let page = Page::new(&wiki, Some("Title".to_string()), Some(7)).unwrap();

        assert_eq!(page.title(), Some("Title"));
        assert_eq!(page.pageid(), Some(7));
        assert!(!page.is_loaded());
    }

    #[test]
    fn test_from_api_result_fields() {
        let wiki = offline_wiki();
        let page = loaded_page(&wiki, 123, "My Page");

        assert_eq!(page.pageid(), Some(123));
        assert_eq!(page.summary(), Some("some summary"));
        assert_eq!(page.url(), Some("http://bla.nada"));
        assert_eq!(page.links(), ["Linked"]);
        assert_eq!(page.redirects(), ["some-redir"]);
        assert_eq!(page.references(), ["some.url"]);
        assert_eq!(page.categories(), ["Some Category"]);
        assert!(page.is_loaded());
    }

    #[test]
    fn test_coordinates_no_coords() {
        assert_eq!(Coordinates::from_entries(&[]), None);
    }

    #[test]
    fn test_coordinates_exact_pair() {
        let wiki = offline_wiki();
        let page = loaded_page(&wiki, 1, "Somewhere");

        let coords = page.coordinates().unwrap();
        assert_eq!(coords.latitude, Decimal::from_str("12.232").unwrap());
        assert_eq!(coords.longitude, Decimal::from_str("23.234").unwrap());
        assert_eq!(coords.latitude.to_string(), "12.232");
    }

    #[test]
    fn test_merge_invalid_page() {
        let wiki = offline_wiki();
        let mut page = Page::new(&wiki, Some("São Paulo".to_string()), Some(456)).unwrap();
        let other = Page::with_pageid(&wiki, 123);

        match page.merge(other) {
            Err(Error::InvalidPage { expected, found }) => {
                assert_eq!(expected, 456);
                assert_eq!(found, 123);
            },
            other => panic!("Expected InvalidPage, got {other:?}"),
        }
        assert_eq!(page.title(), Some("São Paulo"));
    }

    #[test]
    fn test_merge_same_pageid_copies_fields() {
        let wiki = offline_wiki();
        let mut page = Page::new(&wiki, Some("Old".to_string()), Some(123)).unwrap();
        let other = loaded_page(&wiki, 123, "My Page");

        page.merge(other.clone()).unwrap();

        assert_eq!(page.title(), other.title());
        assert_eq!(page.summary(), Some("some summary"));
        assert_eq!(page.categories(), other.categories());
        assert_eq!(page.coordinates(), other.coordinates());
        assert!(page.is_loaded());
    }

    #[test]
    fn test_merge_unset_pageid_takes_incoming_identity() {
        let wiki = offline_wiki();
        let mut page = Page::with_title(&wiki, "Redirect name");
        page.merge(loaded_page(&wiki, 99, "Target")).unwrap();

        assert_eq!(page.title(), Some("Target"));
        assert_eq!(page.pageid(), Some(99));
    }

    #[test]
    fn test_merge_incoming_without_pageid_overwrites_identity() {
        let wiki = offline_wiki();
        let mut page = Page::new(&wiki, Some("Old".to_string()), Some(456)).unwrap();

        page.merge(Page::with_title(&wiki, "Renamed")).unwrap();

        // no pageid on the incoming side means no conflict; every field is copied
        assert_eq!(page.title(), Some("Renamed"));
        assert_eq!(page.pageid(), None);
        assert!(!page.is_loaded());
    }

    #[tokio::test]
    async fn test_load_by_title() -> anyhow::Result<()> {
        let transport = Arc::new(ScriptedTransport::new().respond(
            &[("titles", "São Paulo Futebol Clube")],
            json!({"query": {"pages": [{
                "pageid": 42,
                "title": "São Paulo Futebol Clube",
                "fullurl": "https://pt.wikipedia.org/wiki/S%C3%A3o_Paulo_Futebol_Clube",
                "extract": "Clube paulista."
            }]}})
            .to_string(),
        ));
        let wiki = Wiki::builder().transport(transport.clone()).build()?;

        let mut page = Page::with_title(&wiki, "São Paulo Futebol Clube");
        page.load().await?;

        assert_eq!(page.pageid(), Some(42));
        assert_eq!(page.summary(), Some("Clube paulista."));
        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert!(!sent[0].contains_key("pageids"));
        Ok(())
    }

    #[tokio::test]
    async fn test_load_prefers_pageid() -> anyhow::Result<()> {
        let transport = Arc::new(ScriptedTransport::new().respond(
            &[("pageids", "123")],
            json!({"query": {"pages": [{"pageid": 123, "title": "By Id"}]}}).to_string(),
        ));
        let wiki = Wiki::builder().transport(transport.clone()).build()?;

        let mut page = Page::new(&wiki, Some("Stale title".to_string()), Some(123))?;
        page.load().await?;

        assert_eq!(page.title(), Some("By Id"));
        assert!(!transport.requests()[0].contains_key("titles"));
        Ok(())
    }

    #[tokio::test]
    async fn test_load_missing_page_propagates() -> anyhow::Result<()> {
        let transport = Arc::new(ScriptedTransport::new().respond(
            &[("titles", "Nowhere")],
            json!({"query": {"pages": [{"missing": true, "title": "Nowhere"}]}}).to_string(),
        ));
        let wiki = Wiki::builder().transport(transport).build()?;

        let mut page = Page::with_title(&wiki, "Nowhere");
        let result = page.load().await;

        assert!(matches!(result, Err(Error::MissingPage(title)) if title == "Nowhere"));
        assert!(!page.is_loaded());
        Ok(())
    }
}
