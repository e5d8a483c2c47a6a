//! Blocking page handle.

use std::ops::{Deref, DerefMut};

use wikiq_core::{LoadType, Page, Result};

use crate::driver::Driver;

/// A [`Page`] whose loads block.
///
/// Derefs to the page, so every accessor is available directly.
#[derive(Debug, Clone)]
pub struct BlockingPage {
    page: Page,
    driver: Driver,
}

impl BlockingPage {
    pub(crate) const fn new(page: Page, driver: Driver) -> Self {
        Self { page, driver }
    }

    /// Fetch the page with the default load type.
    pub fn load(&mut self) -> Result<()> {
        self.load_as(LoadType::default())
    }

    /// Fetch the page and merge the result in place.
    pub fn load_as(&mut self, load_type: LoadType) -> Result<()> {
        self.driver.run(self.page.load_as(load_type))
    }

    /// The unwrapped page, for async callers.
    pub const fn as_async_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    /// Unwrap into the async page.
    pub fn into_async(self) -> Page {
        self.page
    }
}

impl Deref for BlockingPage {
    type Target = Page;

    fn deref(&self) -> &Page {
        &self.page
    }
}

impl DerefMut for BlockingPage {
    fn deref_mut(&mut self) -> &mut Page {
        &mut self.page
    }
}
