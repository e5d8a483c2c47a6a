//! Batched page resolution.
//!
//! A [`BatchLoader`] resolves many titles (or pageids) with a single API
//! request and yields the resulting pages lazily, in the order the server
//! returned them. Missing and disambiguation pages become errors; the
//! [`ErrorPolicy`] decides whether such an error ends the stream or is
//! logged and skipped.
//!
//! Resolving a disambiguation page costs one extra request: the first
//! response only flags the page, the candidate titles come from its raw
//! revision text.
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use wikiq_core::{BatchLoader, ErrorPolicy, Wiki};
//!
//! # async fn run() -> wikiq_core::Result<()> {
//! let wiki = Wiki::new()?;
//! let loader = BatchLoader::for_titles(&wiki, ["Lisbon", "Porto", "Nowhere at all"])?
//!     .with_policy(ErrorPolicy::SkipAndLog);
//!
//! let mut pages = loader.load().await?;
//! while let Some(page) = pages.next().await {
//!     println!("{}", page?.label());
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::{HashSet, VecDeque};
use std::sync::LazyLock;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::page::Page;
use crate::params::QueryParams;
use crate::response::{ApiResponse, RawPage};
use crate::wiki::Wiki;
use crate::{Error, Result};

/// Properties requested for every page of a batch.
const PAGE_PROPS: &str = "extracts|redirects|links|coordinates|categories|extlinks|info|pageprops";

/// Link targets in wikitext: `[[Target]]` or `[[Target|alias]]`.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static WIKILINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[(.*?)\]\]").unwrap());

/// Stream of batch results, in server order.
pub type PageStream = BoxStream<'static, Result<Page>>;

/// What happens when a page of the batch cannot be resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Yield the error and end the stream. Pages already yielded stay valid.
    #[default]
    Abort,
    /// Log the error at `warn` and continue with the next page.
    ///
    /// Only page outcomes (missing, ambiguous) are skipped; transport and
    /// decoding failures still end the stream.
    SkipAndLog,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Identifiers {
    Titles(Vec<String>),
    PageIds(Vec<u64>),
}

impl Identifiers {
    fn len(&self) -> usize {
        match self {
            Self::Titles(titles) => titles.len(),
            Self::PageIds(ids) => ids.len(),
        }
    }
}

/// One-shot loader for a batch of titles or pageids.
#[derive(Debug)]
pub struct BatchLoader {
    wiki: Wiki,
    ids: Identifiers,
    policy: ErrorPolicy,
}

impl BatchLoader {
    /// Build a loader from titles and/or pageids. Pageids win when both are
    /// non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingIdentifier`] when both lists are empty.
    pub fn new(
        wiki: &Wiki,
        titles: Vec<String>,
        pageids: Vec<u64>,
        policy: ErrorPolicy,
    ) -> Result<Self> {
        let ids = if !pageids.is_empty() {
            Identifiers::PageIds(pageids)
        } else if !titles.is_empty() {
            Identifiers::Titles(titles)
        } else {
            return Err(Error::MissingIdentifier(
                "a batch needs at least one title or pageid".to_string(),
            ));
        };

        Ok(Self {
            wiki: wiki.clone(),
            ids,
            policy,
        })
    }

    /// Loader over titles with the default policy.
    pub fn for_titles<I, S>(wiki: &Wiki, titles: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let titles = titles.into_iter().map(Into::into).collect();
        Self::new(wiki, titles, Vec::new(), ErrorPolicy::default())
    }

    /// Loader over pageids with the default policy.
    pub fn for_pageids<I>(wiki: &Wiki, pageids: I) -> Result<Self>
    where
        I: IntoIterator<Item = u64>,
    {
        Self::new(
            wiki,
            Vec::new(),
            pageids.into_iter().collect(),
            ErrorPolicy::default(),
        )
    }

    /// Replace the error policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The policy this loader runs with.
    pub const fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Parameters of the batched request, before the gateway adds the fixed
    /// protocol fields.
    pub fn params(&self) -> QueryParams {
        let params = QueryParams::new()
            .with("prop", PAGE_PROPS)
            // summary
            .with("explaintext", "")
            .with("exintro", "")
            // redirects
            .with("rdprop", "title")
            .with("rdlimit", "max")
            // links
            .with("plnamespace", 0)
            .with("pllimit", "max")
            .with("colimit", "max")
            // categories
            .with("cllimit", "max")
            .with("clshow", "!hidden")
            // references
            .with("ellimit", "max")
            .with("inprop", "url")
            .with("ppprop", "disambiguation")
            .with("redirects", "");

        match &self.ids {
            Identifiers::Titles(titles) => params.with("titles", titles.join("|")),
            Identifiers::PageIds(ids) => {
                let joined = ids
                    .iter()
                    .map(u64::to_string)
                    .collect::<Vec<_>>()
                    .join("|");
                params.with("pageids", joined)
            },
        }
    }

    /// Issue the batched request and return the lazy result stream.
    ///
    /// The request itself runs before this returns; errors from it are
    /// returned directly. Disambiguation lookups happen while the stream is
    /// consumed.
    pub async fn load(self) -> Result<PageStream> {
        info!("Loading batch of {} pages", self.ids.len());
        let body = self.wiki.request(self.params()).await?;
        let query = ApiResponse::from_value(body)?.into_query()?;

        let redirect_targets = query.redirects.into_iter().map(|r| r.to).collect();
        let state = BatchState {
            wiki: self.wiki,
            policy: self.policy,
            pending: query.pages.into(),
            redirect_targets,
            finished: false,
        };

        Ok(stream::unfold(state, |mut state| async move {
            let item = state.next_page().await?;
            Some((item, state))
        })
        .boxed())
    }

    /// Load and drain the stream into a vector.
    ///
    /// Under [`ErrorPolicy::Abort`] the first error is returned and the
    /// pages resolved before it are dropped.
    pub async fn collect(self) -> Result<Vec<Page>> {
        self.load().await?.try_collect().await
    }
}

struct BatchState {
    wiki: Wiki,
    policy: ErrorPolicy,
    pending: VecDeque<RawPage>,
    redirect_targets: HashSet<String>,
    finished: bool,
}

impl BatchState {
    async fn next_page(&mut self) -> Option<Result<Page>> {
        if self.finished {
            return None;
        }

        while let Some(raw) = self.pending.pop_front() {
            match self.resolve(raw).await {
                Ok(page) => return Some(Ok(page)),
                Err(err) if err.is_page_error() && self.policy == ErrorPolicy::SkipAndLog => {
                    warn!(category = err.category(), "Skipping page: {err}");
                },
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                },
            }
        }

        self.finished = true;
        None
    }

    async fn resolve(&self, raw: RawPage) -> Result<Page> {
        if raw.missing || raw.invalid {
            return Err(Error::MissingPage(raw.label()));
        }

        if raw.is_disambiguation() {
            let title = raw.label();
            let candidates = disambiguation_candidates(&self.wiki, &title).await?;
            return Err(Error::AmbiguousPage { title, candidates });
        }

        let redirected = raw
            .title
            .as_ref()
            .is_some_and(|title| self.redirect_targets.contains(title));
        Page::from_api_result(&self.wiki, raw, redirected)
    }
}

/// Fetch the raw text of a disambiguation page and extract its candidates.
pub async fn disambiguation_candidates(wiki: &Wiki, title: &str) -> Result<Vec<String>> {
    let params = QueryParams::new()
        .with("prop", "revisions")
        .with("rvprop", "content")
        .with("rvslots", "*")
        .with("rvlimit", 1)
        .with("titles", title);

    let body = wiki.request(params).await?;
    let query = ApiResponse::from_value(body)?.into_query()?;
    let content = query
        .pages
        .first()
        .and_then(RawPage::main_content)
        .ok_or_else(|| Error::Parse(format!("no revision content for '{title}'")))?;

    let candidates = extract_candidates(content);
    debug!("{} candidates for disambiguation page {}", candidates.len(), title);
    Ok(candidates)
}

/// Every `[[target]]` link in `content`, alias dropped, in text order.
///
/// Duplicates are kept.
pub fn extract_candidates(content: &str) -> Vec<String> {
    WIKILINK_RE
        .captures_iter(content)
        .filter_map(|cap| cap.get(1))
        .map(|m| {
            let inner = m.as_str();
            inner.split_once('|').map_or(inner, |(target, _)| target).to_string()
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use serde_json::json;
    use std::sync::Arc;

    const REVCONTENT: &str = "'''Independente''' pode referir-se a:\n\
        * [[Independente Futebol Clube]], clube de Tucuruí\n\
        * [[Independente Esporte Clube|Independente]] de Limeira\n\
        * [[Club Atlético Independiente]] e [[Independente Futebol Clube]]\n\
        {{Desambiguação}}";

    fn wiki_with(transport: &Arc<ScriptedTransport>) -> Wiki {
        Wiki::builder().transport(transport.clone()).build().unwrap()
    }

    fn page_entry(pageid: u64, title: &str) -> serde_json::Value {
        json!({
            "pageid": pageid,
            "title": title,
            "fullurl": "http://bla.nada",
            "extract": "some summary",
            "redirects": [{"title": "some-redir"}],
            "categories": [{"title": "Category:Some Category"}],
            "extlinks": [{"url": "some.url"}]
        })
    }

    #[test]
    fn test_loader_no_titles_no_pageids() {
        let transport = Arc::new(ScriptedTransport::new());
        let wiki = wiki_with(&transport);

        let result = BatchLoader::new(&wiki, Vec::new(), Vec::new(), ErrorPolicy::Abort);
        assert!(matches!(result, Err(Error::MissingIdentifier(_))));
    }

    #[test]
    fn test_params_titles() {
        let transport = Arc::new(ScriptedTransport::new());
        let wiki = wiki_with(&transport);
        let loader = BatchLoader::for_titles(&wiki, ["A page", "other page"]).unwrap();

        let params = loader.params();
        assert_eq!(params.get("titles"), Some("A page|other page"));
        assert_eq!(params.get("prop"), Some(PAGE_PROPS));
        assert_eq!(params.get("ppprop"), Some("disambiguation"));
        assert!(!params.contains_key("pageids"));
    }

    #[test]
    fn test_params_pageids_take_precedence() {
        let transport = Arc::new(ScriptedTransport::new());
        let wiki = wiki_with(&transport);
        let loader = BatchLoader::new(
            &wiki,
            vec!["A page".to_string()],
            vec![123, 456],
            ErrorPolicy::Abort,
        )
        .unwrap();

        let params = loader.params();
        assert_eq!(params.get("pageids"), Some("123|456"));
        assert!(!params.contains_key("titles"));
    }

    #[test]
    fn test_extract_candidates_keeps_order_and_duplicates() {
        let candidates = extract_candidates(REVCONTENT);

        assert_eq!(
            candidates,
            vec![
                "Independente Futebol Clube",
                "Independente Esporte Clube",
                "Club Atlético Independiente",
                "Independente Futebol Clube",
            ]
        );
    }

    #[test]
    fn test_extract_candidates_none() {
        assert!(extract_candidates("no links here [single] {{template}}").is_empty());
    }

    #[tokio::test]
    async fn test_single_request_for_batch() -> anyhow::Result<()> {
        let transport = Arc::new(ScriptedTransport::new().respond(
            &[("titles", "A page|other page")],
            json!({"query": {"pages": [page_entry(1, "A page"), page_entry(2, "other page")]}})
                .to_string(),
        ));
        let wiki = wiki_with(&transport);

        let pages = BatchLoader::for_titles(&wiki, ["A page", "other page"])?
            .collect()
            .await?;

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].title(), Some("A page"));
        assert_eq!(pages[1].pageid(), Some(2));
        assert_eq!(transport.request_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_then_valid_skip_and_log() -> anyhow::Result<()> {
        let transport = Arc::new(ScriptedTransport::new().respond(
            &[("prop", PAGE_PROPS)],
            json!({"query": {"pages": [
                {"missing": true, "title": "bla"},
                page_entry(123, "My Page")
            ]}})
            .to_string(),
        ));
        let wiki = wiki_with(&transport);

        let pages: Vec<_> = BatchLoader::for_titles(&wiki, ["bla", "My Page"])?
            .with_policy(ErrorPolicy::SkipAndLog)
            .load()
            .await?
            .collect()
            .await;

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].as_ref().unwrap().pageid(), Some(123));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_first_aborts_before_any_page() -> anyhow::Result<()> {
        let transport = Arc::new(ScriptedTransport::new().respond(
            &[("prop", PAGE_PROPS)],
            json!({"query": {"pages": [
                {"missing": true, "title": "bla"},
                page_entry(123, "My Page")
            ]}})
            .to_string(),
        ));
        let wiki = wiki_with(&transport);

        let items: Vec<_> = BatchLoader::for_titles(&wiki, ["bla", "My Page"])?
            .load()
            .await?
            .collect()
            .await;

        assert_eq!(items.len(), 1);
        assert!(matches!(&items[0], Err(Error::MissingPage(title)) if title == "bla"));
        Ok(())
    }

    #[tokio::test]
    async fn test_abort_keeps_pages_yielded_before_failure() -> anyhow::Result<()> {
        let transport = Arc::new(ScriptedTransport::new().respond(
            &[("prop", PAGE_PROPS)],
            json!({"query": {"pages": [
                page_entry(1, "First"),
                {"missing": true, "title": "Gone"},
                page_entry(3, "Third")
            ]}})
            .to_string(),
        ));
        let wiki = wiki_with(&transport);

        let mut stream = BatchLoader::for_titles(&wiki, ["First", "Gone", "Third"])?
            .load()
            .await?;

        let first = stream.next().await.unwrap()?;
        assert!(matches!(stream.next().await, Some(Err(Error::MissingPage(_)))));
        assert!(stream.next().await.is_none());

        // the page consumed before the failure is still intact
        assert_eq!(first.title(), Some("First"));
        assert!(first.is_loaded());
        Ok(())
    }

    #[tokio::test]
    async fn test_ambiguous_page_fetches_candidates() -> anyhow::Result<()> {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(
                    &[("prop", "revisions"), ("titles", "Independente")],
                    json!({"query": {"pages": [{
                        "pageid": 10,
                        "title": "Independente",
                        "revisions": [{"slots": {"main": {"content": REVCONTENT}}}]
                    }]}})
                    .to_string(),
                )
                .respond(
                    &[("prop", PAGE_PROPS)],
                    json!({"query": {"pages": [{
                        "pageid": 10,
                        "title": "Independente",
                        "pageprops": {"disambiguation": ""}
                    }]}})
                    .to_string(),
                ),
        );
        let wiki = wiki_with(&transport);

        let result = BatchLoader::for_titles(&wiki, ["Independente"])?
            .collect()
            .await;

        match result {
            Err(Error::AmbiguousPage { title, candidates }) => {
                assert_eq!(title, "Independente");
                assert_eq!(candidates.len(), 4);
                assert_eq!(candidates[0], candidates[3]);
            },
            other => panic!("Expected AmbiguousPage, got {other:?}"),
        }
        assert_eq!(transport.request_count(), 2);
        let content_request = &transport.requests()[1];
        assert_eq!(content_request.get("rvslots"), Some("*"));
        assert_eq!(content_request.get("rvlimit"), Some("1"));
        Ok(())
    }

    #[tokio::test]
    async fn test_redirected_flag_per_page() -> anyhow::Result<()> {
        let transport = Arc::new(ScriptedTransport::new().respond(
            &[("prop", PAGE_PROPS)],
            json!({"query": {
                "redirects": [{"from": "SPFC", "to": "São Paulo Futebol Clube"}],
                "pages": [page_entry(1, "São Paulo Futebol Clube"), page_entry(2, "Santos")]
            }})
            .to_string(),
        ));
        let wiki = wiki_with(&transport);

        let pages = BatchLoader::for_titles(&wiki, ["SPFC", "Santos"])?
            .collect()
            .await?;

        assert!(pages[0].redirected());
        assert!(!pages[1].redirected());
        Ok(())
    }

    #[tokio::test]
    async fn test_transport_error_propagates_from_load() -> anyhow::Result<()> {
        let transport = Arc::new(ScriptedTransport::new());
        let wiki = wiki_with(&transport);

        let result = BatchLoader::for_pageids(&wiki, [1, 2])?.load().await;

        assert!(matches!(result, Err(Error::Transport(_))));
        Ok(())
    }
}
