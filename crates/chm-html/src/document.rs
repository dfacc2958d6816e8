//! Parsed page with its root-relative reference.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

/// A parsed HTML page.
///
/// Keeps the reference the page was loaded under so that hrefs found inside it
/// can be resolved with [`resolve_href`](crate::reference::resolve_href).
pub struct Document {
    reference: String,
    html: Html,
}

impl Document {
    /// Parse a full HTML document.
    #[must_use]
    pub fn parse(reference: impl Into<String>, source: &str) -> Self {
        Self {
            reference: reference.into(),
            html: Html::parse_document(source),
        }
    }

    /// Root-relative reference of this page (e.g., `"library/index.html"`).
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// The `<body>` element, or the root element for documents without one.
    #[must_use]
    pub fn body(&self) -> ElementRef<'_> {
        self.html
            .select(&BODY)
            .next()
            .unwrap_or_else(|| self.html.root_element())
    }

    /// First element in the body matching `selector`.
    #[must_use]
    pub fn find_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.body().select(selector).next()
    }

    /// All elements in the document matching `selector`, in document order.
    pub fn find_all<'a, 'b>(
        &'a self,
        selector: &'b Selector,
    ) -> impl Iterator<Item = ElementRef<'a>> {
        self.html.select(selector)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}
