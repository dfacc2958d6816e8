//! Table-of-contents tree construction.
//!
//! A page contributes children to its node through one of two navigation
//! shapes, tried in priority order:
//!
//! 1. **Outline**: a `div.toctree-wrapper` lists `li.toctree-l1` items, each
//!    linking to another page (recursed into) or to a bookmark (not recursed).
//! 2. **Sidebar**: a `div.sphinxsidebarwrapper` holds the page's own table of
//!    contents, rooted at the `href="#"` heading link. Its nested lists become
//!    bookmark children of the page's node.
//!
//! Pages with neither shape are leaves.

use std::sync::LazyLock;

use chm_html::query::{
    child_elements, find_first, href, next_sibling_element, parent_element, tag_text,
};
use chm_html::reference::{has_anchor, is_external, resolve_href};
use chm_html::{Document, ElementRef, PageSource, Selector};

use crate::error::SitemapError;
use crate::node::TopicNode;
use crate::registry::NormalizedPages;

static TOCTREE_WRAPPER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.toctree-wrapper").unwrap());
static TOCTREE_ITEM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li.toctree-l1").unwrap());
static SIDEBAR_WRAPPER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.sphinxsidebarwrapper").unwrap());
static SIDEBAR_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r##"a.reference.internal[href="#"]"##).unwrap());
static INTERNAL_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.reference.internal").unwrap());
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static LIST: LazyLock<Selector> = LazyLock::new(|| Selector::parse("ul").unwrap());

/// Navigation pattern recognized on a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Shape {
    Outline,
    Sidebar,
}

impl Shape {
    /// Detection order; the first shape found wins.
    const PRIORITY: [Shape; 2] = [Shape::Outline, Shape::Sidebar];

    /// Container element of this shape, if the page has one.
    fn detect(self, doc: &Document) -> Option<ElementRef<'_>> {
        match self {
            Shape::Outline => doc.find_first(&TOCTREE_WRAPPER),
            Shape::Sidebar => doc.find_first(&SIDEBAR_WRAPPER),
        }
    }
}

/// Builds topic subtrees from page navigation markup.
///
/// Owns the registry of visited pages for one conversion; take it with
/// [`into_registry`](Self::into_registry) once every chapter is built.
pub struct TopicTreeBuilder<'a, S: PageSource + ?Sized> {
    pub(crate) source: &'a S,
    pub(crate) registry: NormalizedPages,
    /// Pages currently being expanded, outermost first.
    stack: Vec<String>,
}

impl<'a, S: PageSource + ?Sized> TopicTreeBuilder<'a, S> {
    /// Create a builder reading pages from `source`.
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            registry: NormalizedPages::new(),
            stack: Vec::new(),
        }
    }

    /// Append the children `page` describes to `parent`.
    ///
    /// Outline items linking to whole pages are expanded recursively with the
    /// same `require_structure` policy. A page already being expanded higher
    /// up is not expanded again.
    ///
    /// # Errors
    ///
    /// Returns [`SitemapError::Structure`] if `require_structure` is set and
    /// a page has no usable navigation markup, or [`SitemapError::Source`] if
    /// a page can't be loaded.
    pub fn build_subtree(
        &mut self,
        parent: &mut TopicNode,
        page: &str,
        require_structure: bool,
    ) -> Result<(), SitemapError> {
        if self.stack.iter().any(|visiting| visiting == page) {
            tracing::warn!(page, "Page links back to itself through its outline, not expanding");
            return Ok(());
        }

        let doc = self.source.load_document(page)?;
        let page = doc.reference().to_owned();
        tracing::debug!(page = %page, level = parent.level, "Expanding page");
        self.registry.insert(page.as_str());

        let detected = Shape::PRIORITY
            .into_iter()
            .find_map(|shape| shape.detect(&doc).map(|container| (shape, container)));

        match detected {
            Some((Shape::Outline, wrapper)) => {
                let items = outline_items(&doc, wrapper);
                self.stack.push(page);
                let result = self.expand_outline(parent, items, require_structure);
                self.stack.pop();
                result
            }
            Some((Shape::Sidebar, wrapper)) => {
                if expand_sidebar(parent, wrapper) {
                    Ok(())
                } else if require_structure {
                    Err(SitemapError::Structure { page })
                } else {
                    tracing::debug!(page = %page, "Sidebar without bookmark list");
                    Ok(())
                }
            }
            None if require_structure => Err(SitemapError::Structure { page }),
            None => Ok(()),
        }
    }

    /// Take the registry of every page visited so far.
    pub fn into_registry(self) -> NormalizedPages {
        self.registry
    }

    /// Registry of every page visited so far.
    pub fn registry(&self) -> &NormalizedPages {
        &self.registry
    }

    fn expand_outline(
        &mut self,
        parent: &mut TopicNode,
        items: Vec<(String, String)>,
        require_structure: bool,
    ) -> Result<(), SitemapError> {
        for (name, target) in items {
            let recurse = !target.is_empty() && !has_anchor(&target) && !is_external(&target);
            let child = parent.add_child(name, target.as_str());
            if recurse {
                self.build_subtree(child, &target, require_structure)?;
            }
        }
        Ok(())
    }
}

/// Name and resolved target of every first-level outline item.
fn outline_items(doc: &Document, wrapper: ElementRef<'_>) -> Vec<(String, String)> {
    wrapper
        .select(&TOCTREE_ITEM)
        .filter_map(|item| {
            let Some(link) = find_first(item, &LINK) else {
                tracing::warn!(page = doc.reference(), "Outline item without link, skipping");
                return None;
            };
            let target = match href(link) {
                Some(value) => resolve_href(doc.reference(), value),
                None => {
                    tracing::warn!(page = doc.reference(), "Outline link without href");
                    String::new()
                }
            };
            Some((tag_text(link), target))
        })
        .collect()
}

/// Add the sidebar bookmark list below `parent`.
///
/// Returns `false` if the sidebar has no bookmark list.
fn expand_sidebar(parent: &mut TopicNode, wrapper: ElementRef<'_>) -> bool {
    let Some(heading) = find_first(wrapper, &SIDEBAR_HEADING) else {
        return false;
    };
    let Some(list) = bookmark_list(heading) else {
        return false;
    };
    // Every bookmark lives on the page of the node the sidebar belongs to
    let base = parent.target.clone();
    add_bookmarks(parent, list, &base);
    true
}

/// List holding the bookmarks below the heading link: its next sibling, or
/// the list containing the heading when the page has no sections.
fn bookmark_list(heading: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let is_list = |element: &ElementRef<'_>| element.value().name() == "ul";
    next_sibling_element(heading).filter(is_list).or_else(|| {
        parent_element(heading)
            .and_then(parent_element)
            .filter(is_list)
    })
}

fn add_bookmarks(parent: &mut TopicNode, list: ElementRef<'_>, base: &str) {
    for item in child_elements(list, "li") {
        let Some(link) = find_first(item, &INTERNAL_LINK) else {
            continue;
        };
        let target = href(link)
            .map(|value| resolve_href(base, value))
            .unwrap_or_default();
        let child = parent.add_child(tag_text(link), target);
        if let Some(nested) = find_first(item, &LIST) {
            add_bookmarks(child, nested, base);
        }
    }
}
