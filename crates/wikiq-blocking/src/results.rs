//! Blocking search results.

use std::ops::Deref;

use futures::future::try_join_all;
use tracing::debug;
use wikiq_core::{ErrorPolicy, Page, Result, ResultSet};

use crate::driver::Driver;
use crate::page::BlockingPage;

/// A [`ResultSet`] whose loads block.
///
/// Iterating an owned set loads one page per step. To resolve everything up
/// front use [`load_all`](Self::load_all) (one batched request) or
/// [`load_concurrently`](Self::load_concurrently) (one request per page, all
/// in flight together).
#[derive(Debug, Clone)]
pub struct BlockingResultSet {
    results: ResultSet,
    driver: Driver,
}

impl BlockingResultSet {
    pub(crate) const fn new(results: ResultSet, driver: Driver) -> Self {
        Self { results, driver }
    }

    /// Resolve every page with a single batched request.
    pub fn load_all(&mut self) -> Result<()> {
        self.load_all_with(ErrorPolicy::Abort)
    }

    /// Resolve every page with a single batched request under `policy`.
    pub fn load_all_with(&mut self, policy: ErrorPolicy) -> Result<()> {
        self.driver.run(self.results.load_all_with(policy))
    }

    /// Load every page with its own request, all concurrently, inside one
    /// blocking call.
    ///
    /// Order is kept. The set is replaced only when every load succeeds;
    /// the first failure is returned and the set is left as it was.
    pub fn load_concurrently(&mut self) -> Result<()> {
        let mut pages = self.results.pages().to_vec();
        debug!("Loading {} pages concurrently", pages.len());
        self.driver
            .run(try_join_all(pages.iter_mut().map(|page| page.load())))?;
        self.results = ResultSet::new(pages);
        Ok(())
    }

    /// Page at `index`, without loading it.
    pub fn page(&self, index: usize) -> Option<BlockingPage> {
        self.results
            .get(index)
            .map(|page| BlockingPage::new(page.clone(), self.driver.clone()))
    }

    /// Take the pages out as they are, without loading them.
    pub fn into_pages(self) -> Vec<BlockingPage> {
        let driver = self.driver;
        self.results
            .into_pages()
            .into_iter()
            .map(|page| BlockingPage::new(page, driver.clone()))
            .collect()
    }

    /// The wrapped async result set.
    pub const fn as_async(&self) -> &ResultSet {
        &self.results
    }

    /// Unwrap into the async result set.
    pub fn into_async(self) -> ResultSet {
        self.results
    }
}

impl Deref for BlockingResultSet {
    type Target = ResultSet;

    fn deref(&self) -> &ResultSet {
        &self.results
    }
}

impl IntoIterator for BlockingResultSet {
    type Item = Result<BlockingPage>;
    type IntoIter = LoadingIter;

    fn into_iter(self) -> LoadingIter {
        LoadingIter {
            pages: self.results.into_pages().into_iter(),
            driver: self.driver,
        }
    }
}

/// Iterator that loads each page as it is reached.
///
/// A failed load is yielded as an error and iteration continues.
#[derive(Debug)]
pub struct LoadingIter {
    pages: std::vec::IntoIter<Page>,
    driver: Driver,
}

impl Iterator for LoadingIter {
    type Item = Result<BlockingPage>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut page = BlockingPage::new(self.pages.next()?, self.driver.clone());
        let loaded = page.load();
        Some(loaded.map(|()| page))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pages.size_hint()
    }
}

impl ExactSizeIterator for LoadingIter {}
