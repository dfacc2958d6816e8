//! In-memory page source for testing.
//!
//! Provides [`MemorySource`] for unit testing the builders without disk access.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::reference::split_anchor;
use crate::source::{PageSource, SourceError};

/// Page source backed by a map of reference to HTML.
///
/// Records every load so tests can assert on traversal order.
///
/// # Example
///
/// ```ignore
/// use chm_html::{MemorySource, PageSource};
///
/// let source = MemorySource::new()
///     .with_page("index.html", "<body>Home</body>");
///
/// let html = source.load("index.html").unwrap();
/// assert_eq!(source.loads(), vec!["index.html"]);
/// ```
#[derive(Debug, Default)]
pub struct MemorySource {
    pages: HashMap<String, String>,
    loads: RefCell<Vec<String>>,
}

impl MemorySource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page.
    #[must_use]
    pub fn with_page(mut self, reference: &str, html: &str) -> Self {
        self.pages.insert(reference.to_owned(), html.to_owned());
        self
    }

    /// References loaded so far, in load order.
    #[must_use]
    pub fn loads(&self) -> Vec<String> {
        self.loads.borrow().clone()
    }
}

impl PageSource for MemorySource {
    fn load(&self, reference: &str) -> Result<String, SourceError> {
        let (page, _) = split_anchor(reference);
        self.loads.borrow_mut().push(page.to_owned());
        self.pages
            .get(page)
            .cloned()
            .ok_or_else(|| SourceError::not_found(page))
    }
}
