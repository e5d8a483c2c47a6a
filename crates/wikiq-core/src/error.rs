//! Error types and handling for wikiq-core operations.
//!
//! A single [`Error`] enum covers transport failures, malformed responses,
//! configuration problems and the page-level outcomes of a lookup (missing,
//! ambiguous, conflicting merge).
//!
//! ## Error Categories
//!
//! - **Transport**: HTTP requests and custom transports
//! - **Decoding**: JSON/TOML decoding and unexpected response shapes
//! - **Configuration**: invalid settings or API URL templates
//! - **Page**: missing, ambiguous and conflicting pages
//! - **Construction**: pages or loaders built without any identifier
//!
//! Page-level errors are never recoverable by retrying the same request:
//!
//! ```rust
//! use wikiq_core::Error;
//!
//! let err = Error::AmbiguousPage {
//!     title: "Mercury".to_string(),
//!     candidates: vec!["Mercury (planet)".to_string(), "Mercury (element)".to_string()],
//! };
//! assert!(!err.is_recoverable());
//! assert_eq!(err.category(), "ambiguous_page");
//! ```

use thiserror::Error;

/// The main error type for wikiq-core operations.
///
/// All public functions in wikiq-core return `Result<T, Error>`.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Raised while reading configuration files or building the runtime of
    /// the blocking facade.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed.
    ///
    /// Wraps the underlying `reqwest::Error` unchanged, including non-2xx
    /// statuses surfaced through `error_for_status`.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A non-HTTP transport failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body or a config file could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The response decoded but did not have the expected shape.
    ///
    /// ## Common Causes
    ///
    /// - A `query` object without `pages` or `search`
    /// - A revision payload without `slots.main.content`
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The resolved API URL is malformed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A page or batch loader was built with neither a title nor a pageid.
    #[error("Missing identifier: {0}")]
    MissingIdentifier(String),

    /// The requested page does not exist on the wiki.
    #[error("The page {0} does not exist")]
    MissingPage(String),

    /// The requested page is a disambiguation page.
    ///
    /// `candidates` holds every linked title found in the page markup, in
    /// text order. Duplicates are kept.
    #[error("Page {title} is ambiguous. The possible candidates are:\n{}", candidates.join("\n"))]
    AmbiguousPage {
        /// Title of the disambiguation page.
        title: String,
        /// Linked titles extracted from the page markup.
        candidates: Vec<String>,
    },

    /// Two pages with different pageids were merged.
    #[error("Cannot merge page {found} into page {expected}")]
    InvalidPage {
        /// Pageid of the page being merged into.
        expected: u64,
        /// Pageid of the incoming page.
        found: u64,
    },

    /// The async runtime could not drive the operation.
    ///
    /// Returned by the blocking facade when it is called from inside a
    /// running async context.
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Check if the error might go away if the same call is made again.
    ///
    /// Only connection-level failures qualify. This crate never retries on
    /// its own; the hint is for callers that want to.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Get the error category as a string identifier.
    ///
    /// Stable values suitable for structured log fields.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Transport(_) => "transport",
            Self::Serialization(_) => "serialization",
            Self::Parse(_) => "parse",
            Self::Config(_) => "config",
            Self::InvalidUrl(_) => "invalid_url",
            Self::MissingIdentifier(_) => "missing_identifier",
            Self::MissingPage(_) => "missing_page",
            Self::AmbiguousPage { .. } => "ambiguous_page",
            Self::InvalidPage { .. } => "invalid_page",
            Self::Runtime(_) => "runtime",
        }
    }

    /// Whether this error describes a page outcome rather than a failed call.
    ///
    /// Page errors are the ones a batch load may skip under
    /// [`ErrorPolicy::SkipAndLog`](crate::ErrorPolicy::SkipAndLog).
    #[must_use]
    pub const fn is_page_error(&self) -> bool {
        matches!(
            self,
            Self::MissingPage(_) | Self::AmbiguousPage { .. } | Self::InvalidPage { .. }
        )
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
