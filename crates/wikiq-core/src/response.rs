//! Typed view of the query API responses consumed by this crate.
//!
//! Only the fields the loader reads are modelled; everything else in the
//! payload is ignored. All lists default to empty because the API omits
//! them when a page has no entries.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use crate::{Error, Result};

/// Top-level API response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResponse {
    /// The `query` module output.
    #[serde(default)]
    pub query: Option<QueryResult>,
    /// Error object returned instead of `query` on a rejected request.
    #[serde(default)]
    pub error: Option<ApiError>,
}

impl ApiResponse {
    /// Decode a parsed JSON body.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// The `query` object, or an error if the API rejected the request.
    pub fn into_query(self) -> Result<QueryResult> {
        if let Some(err) = self.error {
            return Err(Error::Parse(format!(
                "API returned error '{}': {}",
                err.code, err.info
            )));
        }
        self.query
            .ok_or_else(|| Error::Parse("response has no 'query' object".to_string()))
    }
}

/// Error object of a rejected API request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiError {
    /// Machine-readable error code.
    #[serde(default)]
    pub code: String,
    /// Human-readable description.
    #[serde(default)]
    pub info: String,
}

/// The `query` object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResult {
    /// Page entries, in server order.
    #[serde(default)]
    pub pages: Vec<RawPage>,
    /// Search hits for `list=search`.
    #[serde(default)]
    pub search: Vec<SearchHit>,
    /// Redirects that were followed while resolving the requested titles.
    #[serde(default)]
    pub redirects: Vec<RedirectEntry>,
}

/// One `list=search` hit.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    /// Page title.
    pub title: String,
    /// Page id.
    pub pageid: u64,
}

/// A followed redirect (`from` → `to`).
#[derive(Debug, Clone, Deserialize)]
pub struct RedirectEntry {
    /// Requested title.
    pub from: String,
    /// Title the redirect points to.
    pub to: String,
}

/// One page entry of a `prop=` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPage {
    /// Page id; absent for missing pages.
    #[serde(default)]
    pub pageid: Option<u64>,
    /// Page title.
    #[serde(default)]
    pub title: Option<String>,
    /// Set when the page does not exist.
    #[serde(default)]
    pub missing: bool,
    /// Set when the requested title is not a valid page name.
    #[serde(default)]
    pub invalid: bool,
    /// Page properties (`ppprop=disambiguation`).
    #[serde(default)]
    pub pageprops: Option<serde_json::Map<String, serde_json::Value>>,
    /// Canonical URL (`inprop=url`).
    #[serde(default)]
    pub fullurl: Option<String>,
    /// Plain-text intro (`prop=extracts`).
    #[serde(default)]
    pub extract: Option<String>,
    /// Linked articles.
    #[serde(default)]
    pub links: Vec<TitleRef>,
    /// Pages redirecting here.
    #[serde(default)]
    pub redirects: Vec<TitleRef>,
    /// External links.
    #[serde(default)]
    pub extlinks: Vec<ExternalLink>,
    /// Visible categories, with their namespace prefix.
    #[serde(default)]
    pub categories: Vec<TitleRef>,
    /// Geographic coordinates.
    #[serde(default)]
    pub coordinates: Vec<RawCoordinate>,
    /// Revisions (`prop=revisions`).
    #[serde(default)]
    pub revisions: Vec<Revision>,
}

impl RawPage {
    /// Whether the page carries the disambiguation page property.
    pub fn is_disambiguation(&self) -> bool {
        self.pageprops
            .as_ref()
            .is_some_and(|props| props.contains_key("disambiguation"))
    }

    /// Title if known, otherwise the pageid, for messages.
    pub fn label(&self) -> String {
        match (&self.title, self.pageid) {
            (Some(title), _) => title.clone(),
            (None, Some(id)) => id.to_string(),
            (None, None) => "<unknown>".to_string(),
        }
    }

    /// Content of the main slot of the first revision.
    pub fn main_content(&self) -> Option<&str> {
        self.revisions
            .first()
            .and_then(|rev| rev.slots.main.as_ref())
            .and_then(|slot| slot.content.as_deref())
    }
}

/// `{ "title": ... }` entry used by links, redirects and categories.
#[derive(Debug, Clone, Deserialize)]
pub struct TitleRef {
    /// Referenced title.
    pub title: String,
}

/// External link entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalLink {
    /// Link target.
    pub url: String,
}

/// Coordinate entry with exact decimal components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RawCoordinate {
    /// Latitude.
    #[serde(deserialize_with = "exact_decimal")]
    pub lat: Decimal,
    /// Longitude.
    #[serde(deserialize_with = "exact_decimal")]
    pub lon: Decimal,
}

/// A page revision.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Revision {
    /// Content slots (`rvslots=*`).
    #[serde(default)]
    pub slots: Slots,
}

/// Revision slots.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Slots {
    /// The main slot.
    #[serde(default)]
    pub main: Option<Slot>,
}

/// One revision slot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Slot {
    /// Raw wikitext.
    #[serde(default)]
    pub content: Option<String>,
}

/// Decode a JSON number into a `Decimal` through its shortest textual form.
///
/// `12.232` decodes to exactly `12.232`, not the nearest binary float.
fn exact_decimal<'de, D>(deserializer: D) -> std::result::Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(serde::de::Error::custom)
}
