//! In-memory cache of raw API responses.
//!
//! [`ResultsCache`] maps a request [`fingerprint`] to the raw body the server
//! returned for it. There is no eviction, no TTL and no size bound: entries
//! live as long as the owning [`Wiki`](crate::Wiki). The cache itself does no
//! locking; the gateway serialises access to it.

use std::collections::HashMap;

use base64::{Engine, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};

use crate::params::QueryParams;

/// Unbounded mapping from request fingerprint to raw response body.
#[derive(Debug, Default, Clone)]
pub struct ResultsCache {
    entries: HashMap<String, String>,
}

impl ResultsCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Return the cached value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Remove `key` from the cache. Missing keys are ignored.
    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached responses.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cache key for a complete parameter set.
///
/// SHA-256 over the canonical (key-sorted) encoding, base64 encoded. Two
/// parameter sets with the same pairs always share a fingerprint regardless
/// of the order they were built in.
#[must_use]
pub fn fingerprint(params: &QueryParams) -> String {
    let mut hasher = Sha256::new();
    hasher.update(params.canonical().as_bytes());
    STANDARD.encode(hasher.finalize())
}
