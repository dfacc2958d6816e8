//! Sitemap construction errors.

use chm_html::SourceError;

/// Error returned when a sitemap cannot be built.
///
/// Every variant aborts the whole conversion; partial trees are never
/// serialized.
#[derive(Debug, thiserror::Error)]
pub enum SitemapError {
    /// A page that must carry navigation markup has none.
    #[error("No toctree-wrapper or sphinxsidebarwrapper found in {page}")]
    Structure {
        /// Offending page reference.
        page: String,
    },
    /// A keyword item resolved to empty text.
    #[error("Empty keyword in {page}: {context}")]
    EmptyKeyword {
        /// Index page reference.
        page: String,
        /// Markup of the offending item, for locating it.
        context: String,
    },
    /// A page lacks the table the grouping relies on.
    #[error("No {table} table found in {page}")]
    MissingTable {
        /// Offending page reference.
        page: String,
        /// Selector of the expected table.
        table: &'static str,
    },
    /// A page could not be loaded.
    #[error(transparent)]
    Source(#[from] SourceError),
}
