//! # wikiq-core
//!
//! Async client for the MediaWiki query API.
//!
//! The crate turns wiki searches and page lookups into typed [`Page`] values,
//! batching page loads into as few HTTP requests as the API allows and
//! answering repeated requests from an in-memory cache.
//!
//! ## Architecture
//!
//! - **Gateway**: [`Wiki`] builds every request, adds the fixed protocol
//!   fields and caches raw responses by parameter fingerprint
//! - **Batch loading**: [`BatchLoader`] resolves many pages with one request
//!   and follows disambiguation pages
//! - **Pages and results**: [`Page`] carries the extracted data, [`ResultSet`]
//!   holds the pages returned by a search
//! - **Transport**: the [`Transport`] trait is the network seam;
//!   [`HttpTransport`] is the reqwest implementation
//! - **Error handling**: [`Error`] separates page-level failures from
//!   transport and parse failures
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wikiq_core::{Result, Wiki};
//!
//! # async fn run() -> Result<()> {
//! let wiki = Wiki::new()?;
//!
//! let page = wiki.get_page("Rust (programming language)").await?;
//! println!("{}", page.summary().unwrap_or_default());
//!
//! let mut results = wiki.search("borrow checker", 5, 0).await?;
//! results.load_all().await?;
//! println!("{:?}", results.titles());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! ```rust,no_run
//! use wikiq_core::{Error, Wiki};
//!
//! # async fn run(wiki: Wiki) {
//! match wiki.get_page("Mercury").await {
//!     Ok(page) => println!("{}", page.label()),
//!     Err(Error::AmbiguousPage { candidates, .. }) => {
//!         println!("did you mean one of {candidates:?}?");
//!     },
//!     Err(e) if e.is_recoverable() => eprintln!("Try again later: {e}"),
//!     Err(e) => eprintln!("Fatal error: {e}"),
//! }
//! # }
//! ```

/// Response cache keyed by request fingerprint
pub mod cache;
/// Client configuration
pub mod config;
/// Error types and result aliases
pub mod error;
/// Batched page loading and disambiguation
pub mod loader;
/// Wiki page model
pub mod page;
/// Ordered query parameters
pub mod params;
/// Typed view of API responses
pub mod response;
/// Search results
pub mod results;
/// Network seam and HTTP implementation
pub mod transport;
/// The API gateway
pub mod wiki;

/// Scripted in-memory transport for tests
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use cache::{ResultsCache, fingerprint};
pub use config::WikiConfig;
pub use error::{Error, Result};
pub use loader::{BatchLoader, ErrorPolicy, PageStream};
pub use page::{Coordinates, LoadType, Page};
pub use params::QueryParams;
pub use results::ResultSet;
pub use transport::{HttpTransport, Transport};
pub use wiki::{DEFAULT_SEARCH_LIMIT, Wiki, WikiBuilder};
