//! Registry of pages already processed by the tree builders.

use std::collections::HashSet;

/// Ordered set of page references visited while building sitemaps.
///
/// The normalization pass processes these pages first and then every other
/// page of the documentation root, skipping the ones recorded here. The
/// project file lists them in insertion order.
#[derive(Debug, Default, Clone)]
pub struct NormalizedPages {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl NormalizedPages {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a page. Returns `false` if it was already recorded.
    pub fn insert(&mut self, page: impl Into<String>) -> bool {
        let page = page.into();
        if self.seen.contains(&page) {
            return false;
        }
        self.seen.insert(page.clone());
        self.order.push(page);
        true
    }

    /// Check whether a page was recorded.
    #[must_use]
    pub fn contains(&self, page: &str) -> bool {
        self.seen.contains(page)
    }

    /// Recorded pages in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of recorded pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no page was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
