//! Scripted in-memory transport for tests.
//!
//! Enabled for this crate's own tests and, through the `test-support`
//! feature, for downstream crates.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::params::QueryParams;
use crate::transport::Transport;
use crate::{Error, Result};

struct Rule {
    matches: Vec<(String, String)>,
    body: String,
}

/// Transport that answers from a list of canned responses.
///
/// Each rule is a set of `key=value` pairs; the first rule whose pairs are
/// all present in the request wins. Unmatched requests fail with
/// [`Error::Transport`]. Every request is recorded.
#[derive(Default)]
pub struct ScriptedTransport {
    rules: Vec<Rule>,
    requests: Mutex<Vec<QueryParams>>,
}

impl ScriptedTransport {
    /// Transport with no rules; every request fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule answering `body` to requests containing all of `matches`.
    #[must_use]
    pub fn respond(mut self, matches: &[(&str, &str)], body: impl Into<String>) -> Self {
        self.rules.push(Rule {
            matches: matches
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            body: body.into(),
        });
        self
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<QueryParams> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, _url: &str, params: &QueryParams) -> Result<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(params.clone());

        self.rules
            .iter()
            .find(|rule| {
                rule.matches
                    .iter()
                    .all(|(k, v)| params.get(k) == Some(v.as_str()))
            })
            .map(|rule| rule.body.clone())
            .ok_or_else(|| Error::Transport(format!("no scripted response for {params}")))
    }
}
