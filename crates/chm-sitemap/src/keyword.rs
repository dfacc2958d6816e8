//! Keyword index extraction from the global index page.
//!
//! The index page holds one `table.genindextable` per initial. Each cell
//! carries a list whose top-level items are keywords:
//!
//! ```html
//! <li><a href="library/cmd.html#index-0">in a command interpreter</a></li>
//! <li><a href="library/fnmatch.html#index-2">in glob-style wildcards</a>,
//!     <a href="library/glob.html#index-1">[1]</a></li>
//! <li>built-in function
//!   <ul><li><a href="library/functions.html#abs">abs</a></li></ul>
//! </li>
//! ```

use std::sync::LazyLock;

use chm_html::query::{
    child_elements, direct_text, find_first, first_child_element, href, tag_text,
};
use chm_html::reference::resolve_href;
use chm_html::{Document, ElementRef, Selector};

use crate::error::SitemapError;
use crate::node::{KeywordEntry, Reference};

static INDEX_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.indextable.genindextable").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static LIST: LazyLock<Selector> = LazyLock::new(|| Selector::parse("ul").unwrap());

/// Links an index item carries directly.
enum Links<'a> {
    NoLinks,
    Single(ElementRef<'a>),
    Multiple(Vec<ElementRef<'a>>),
}

impl<'a> Links<'a> {
    fn of(item: ElementRef<'a>) -> Self {
        let mut links: Vec<ElementRef<'a>> = child_elements(item, "a").collect();
        match links.len() {
            0 => Links::NoLinks,
            1 => Links::Single(links.remove(0)),
            _ => Links::Multiple(links),
        }
    }
}

/// Collect the keyword entries of the global index page in document order.
///
/// # Errors
///
/// Returns [`SitemapError::EmptyKeyword`] if a keyword item has no text, or
/// [`SitemapError::MissingTable`] if the page has no index table.
pub fn build_keyword_index(doc: &Document) -> Result<Vec<KeywordEntry>, SitemapError> {
    let mut entries = Vec::new();
    let mut tables = 0usize;

    for table in doc.find_all(&INDEX_TABLE) {
        tables += 1;
        for cell in table.select(&CELL) {
            let Some(list) = find_first(cell, &LIST) else {
                continue;
            };
            for item in child_elements(list, "li") {
                if let Some(entry) = keyword_entry(doc, item)? {
                    entries.push(entry);
                }
            }
        }
    }

    if tables == 0 {
        return Err(SitemapError::MissingTable {
            page: doc.reference().to_owned(),
            table: "indextable genindextable",
        });
    }
    tracing::debug!(
        page = doc.reference(),
        tables,
        keywords = entries.len(),
        "Keyword index collected"
    );
    Ok(entries)
}

/// Entry for a top-level item, with its nested items as sub-entries.
fn keyword_entry(
    doc: &Document,
    item: ElementRef<'_>,
) -> Result<Option<KeywordEntry>, SitemapError> {
    let Some(sublist) = first_child_element(item, "ul") else {
        return linked_entry(doc, item);
    };

    let mut entry = match linked_entry(doc, item)? {
        Some(entry) => entry,
        None => {
            let keyword = direct_text(item);
            if keyword.is_empty() {
                return Err(empty_keyword(doc, item));
            }
            KeywordEntry::see_also(keyword)
        }
    };
    for subitem in child_elements(sublist, "li") {
        if let Some(subentry) = linked_entry(doc, subitem)? {
            entry.subentries.push(subentry);
        }
    }
    Ok(Some(entry))
}

/// Clickable entry built from the links `item` carries directly.
fn linked_entry(
    doc: &Document,
    item: ElementRef<'_>,
) -> Result<Option<KeywordEntry>, SitemapError> {
    let target = |link: ElementRef<'_>| {
        href(link)
            .map(|value| resolve_href(doc.reference(), value))
            .unwrap_or_default()
    };

    let (keyword, references) = match Links::of(item) {
        Links::NoLinks => return Ok(None),
        Links::Single(link) => (tag_text(link), vec![Reference::new(target(link))]),
        Links::Multiple(links) => {
            let references = links
                .iter()
                .enumerate()
                .map(|(ordinal, &link)| match ordinal {
                    0 => Reference::new(target(link)),
                    _ => Reference::numbered(target(link), ordinal),
                })
                .collect();
            (tag_text(links[0]), references)
        }
    };

    if keyword.is_empty() {
        return Err(empty_keyword(doc, item));
    }
    Ok(Some(KeywordEntry::linked(keyword, references)))
}

fn empty_keyword(doc: &Document, item: ElementRef<'_>) -> SitemapError {
    SitemapError::EmptyKeyword {
        page: doc.reference().to_owned(),
        context: item.html(),
    }
}
