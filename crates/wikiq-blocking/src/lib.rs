//! # wikiq-blocking
//!
//! Synchronous surface over [`wikiq_core`].
//!
//! Every call runs the matching async operation to completion on a dedicated
//! current-thread runtime and returns its result. Batch operations keep their
//! batching: [`BlockingResultSet::load_all`] is still one request, and
//! [`BlockingResultSet::load_concurrently`] runs all per-page loads together
//! inside a single blocking call.
//!
//! ```rust,no_run
//! use wikiq_blocking::BlockingWiki;
//!
//! let wiki = BlockingWiki::new()?;
//! let mut results = wiki.search("Lisbon", 5, 0)?;
//! results.load_all()?;
//! for page in results.iter() {
//!     println!("{}", page.label());
//! }
//! # Ok::<(), wikiq_core::Error>(())
//! ```
//!
//! Blocking calls made from inside a tokio runtime fail with
//! [`Error::Runtime`](wikiq_core::Error::Runtime); async code should use
//! `wikiq-core` directly.

/// Runtime driver
pub mod driver;
/// Blocking page handle
pub mod page;
/// Blocking search results
pub mod results;
/// Blocking gateway
pub mod wiki;

pub use driver::Driver;
pub use page::BlockingPage;
pub use results::{BlockingResultSet, LoadingIter};
pub use wiki::BlockingWiki;
pub use wikiq_core::{Error, ErrorPolicy, LoadType, Result, WikiConfig};
