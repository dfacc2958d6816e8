//! Structure queries over parsed pages.
//!
//! Thin helpers over [`scraper`] that mirror what the tree builders need:
//! non-recursive child iteration, sibling/ancestor hops and the two flavours
//! of visible text (direct text nodes only, or every descendant text node).

use ego_tree::NodeId;
use scraper::node::Node;
use scraper::{ElementRef, Selector};

/// First descendant of `scope` matching `selector`.
#[must_use]
pub fn find_first<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).next()
}

/// Direct child elements of `parent` with the given tag name.
pub fn child_elements<'a>(
    parent: ElementRef<'a>,
    tag: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == tag)
}

/// First direct child element of `parent` with the given tag name.
#[must_use]
pub fn first_child_element<'a>(parent: ElementRef<'a>, tag: &'a str) -> Option<ElementRef<'a>> {
    child_elements(parent, tag).next()
}

/// Next sibling that is an element, skipping text and comments.
#[must_use]
pub fn next_sibling_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

/// Parent node if it is an element.
#[must_use]
pub fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

/// Nearest ancestor element with the given tag name.
#[must_use]
pub fn ancestor_element<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == tag)
}

/// Value of the `href` attribute, if present.
#[must_use]
pub fn href<'a>(element: ElementRef<'a>) -> Option<&'a str> {
    element.value().attr("href")
}

/// First entry of the `class` attribute in source order.
#[must_use]
pub fn first_class<'a>(element: ElementRef<'a>) -> Option<&'a str> {
    element
        .value()
        .attr("class")
        .and_then(|classes| classes.split_ascii_whitespace().next())
}

/// Text of every descendant text node, each trimmed, empty ones dropped,
/// concatenated without separator.
///
/// `<a><code>os.path</code> — <em>Common</em></a>` yields `"os.path—Common"`.
#[must_use]
pub fn tag_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect()
}

/// Like [`tag_text`] but ignores the subtree rooted at `skip`.
#[must_use]
pub fn tag_text_excluding(element: ElementRef<'_>, skip: NodeId) -> String {
    let mut text = String::new();
    for node in element.descendants() {
        if node.ancestors().any(|ancestor| ancestor.id() == skip) || node.id() == skip {
            continue;
        }
        if let Node::Text(fragment) = node.value() {
            text.push_str(fragment.trim());
        }
    }
    text
}

/// Text of direct text-node children only, each trimmed and concatenated.
///
/// `<li>built-in function<ul>...</ul></li>` yields `"built-in function"`.
#[must_use]
pub fn direct_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|child| child.value().as_text())
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .collect()
}
