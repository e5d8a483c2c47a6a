//! Search results container.
//!
//! A [`ResultSet`] holds the unresolved pages returned by
//! [`Wiki::search`](crate::Wiki::search). Pages can be resolved one at a time
//! while streaming ([`ResultSet::into_stream`], one request per page) or all
//! at once with [`ResultSet::load_all`] (one request for the whole set).

use futures::stream::{self, Stream, StreamExt};
use tracing::debug;

use crate::loader::{BatchLoader, ErrorPolicy};
use crate::page::Page;
use crate::{Error, Result};

/// Ordered, caller-owned collection of pages.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pages: Vec<Page>,
}

impl ResultSet {
    /// Wrap a list of pages, keeping their order.
    #[must_use]
    pub const fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    /// Number of pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Page at `index`.
    pub fn get(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Iterate over the pages as they are, without loading anything.
    pub fn iter(&self) -> std::slice::Iter<'_, Page> {
        self.pages.iter()
    }

    /// The pages as a slice.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Mutable access to the pages, for callers driving their own loads.
    pub fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    /// Titles of the pages that have one, in order.
    pub fn titles(&self) -> Vec<&str> {
        self.pages.iter().filter_map(Page::title).collect()
    }

    /// Take the pages out of the set.
    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }

    /// Load each page as it is consumed, in order.
    ///
    /// One request per page. A failed page is yielded as an error and the
    /// stream carries on with the next one.
    pub fn into_stream(self) -> impl Stream<Item = Result<Page>> + Send {
        stream::iter(self.pages).then(|mut page| async move {
            page.load().await?;
            Ok(page)
        })
    }

    /// Resolve every page with a single batched request.
    ///
    /// Equivalent to [`load_all_with`](Self::load_all_with) with
    /// [`ErrorPolicy::Abort`].
    pub async fn load_all(&mut self) -> Result<()> {
        self.load_all_with(ErrorPolicy::Abort).await
    }

    /// Resolve every page with a single batched request and replace the
    /// contents with the server's answer, in server order.
    ///
    /// Pageids are used when every page has one, titles otherwise. The
    /// contents change only if the whole batch succeeds; under
    /// [`ErrorPolicy::SkipAndLog`] that means the set shrinks to the pages
    /// that resolved. An empty set is left alone and issues no request.
    pub async fn load_all_with(&mut self, policy: ErrorPolicy) -> Result<()> {
        let Some(first) = self.pages.first() else {
            return Ok(());
        };
        let wiki = first.wiki().clone();

        let pageids: Option<Vec<u64>> = self.pages.iter().map(Page::pageid).collect();
        let loader = if let Some(pageids) = pageids {
            BatchLoader::for_pageids(&wiki, pageids)?
        } else {
            let titles: Option<Vec<String>> = self
                .pages
                .iter()
                .map(|page| page.title().map(ToString::to_string))
                .collect();
            let titles = titles.ok_or_else(|| {
                Error::MissingIdentifier(
                    "result set mixes pages without pageids and pages without titles".to_string(),
                )
            })?;
            BatchLoader::for_titles(&wiki, titles)?
        };

        let pages = loader.with_policy(policy).collect().await?;
        debug!("Resolved {} of {} pages", pages.len(), self.pages.len());
        self.pages = pages;
        Ok(())
    }
}

impl From<Vec<Page>> for ResultSet {
    fn from(pages: Vec<Page>) -> Self {
        Self::new(pages)
    }
}

impl IntoIterator for ResultSet {
    type Item = Page;
    type IntoIter = std::vec::IntoIter<Page>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Page;
    type IntoIter = std::slice::Iter<'a, Page>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}
