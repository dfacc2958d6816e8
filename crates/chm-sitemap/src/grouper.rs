//! First-letter groupings for the glossary and the module index.

use std::sync::LazyLock;

use chm_html::query::{
    ancestor_element, child_elements, find_first, first_class, href, tag_text, tag_text_excluding,
};
use chm_html::reference::resolve_href;
use chm_html::{Document, ElementRef, PageSource, Selector};

use crate::error::SitemapError;
use crate::node::TopicNode;
use crate::topic::TopicTreeBuilder;

static TERM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("dt").unwrap());
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static MODULE_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.indextable.modindextable").unwrap());
static MODULE_NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("code.xref").unwrap());

/// Label of the catch-all glossary bucket.
const CATCH_ALL: char = '@';

/// Glossary bucket labels: the catch-all followed by `A` to `Z`.
fn bucket_labels() -> impl Iterator<Item = char> {
    std::iter::once(CATCH_ALL).chain('A'..='Z')
}

/// Position of the bucket for `term` among the bucket labels.
fn bucket_index(term: &str) -> usize {
    let first = term
        .trim_matches([' ', '_'])
        .chars()
        .next()
        .and_then(|c| c.to_uppercase().next());
    match first {
        Some(letter @ 'A'..='Z') => 1 + (letter as usize - 'A' as usize),
        _ => 0,
    }
}

/// Row kind of the module index table.
#[derive(Debug, PartialEq, Eq)]
enum ModuleRow {
    /// Letter header starting a new bucket.
    Capital { label: String, target: String },
    /// Module starting a new second-level node.
    Module { name: String, target: String },
    /// Submodule attached to the current module.
    Submodule { name: String, target: String },
    /// Spacer or anything else without content.
    Other,
}

impl ModuleRow {
    fn classify(doc: &Document, row: ElementRef<'_>) -> Self {
        let class = first_class(row);
        if class == Some("cap") {
            let label = tag_text(row).to_uppercase();
            let target = match row.value().id() {
                Some(id) => format!("{}#{id}", doc.reference()),
                None => doc.reference().to_owned(),
            };
            return ModuleRow::Capital { label, target };
        }

        let Some(code) = find_first(row, &MODULE_NAME) else {
            return ModuleRow::Other;
        };
        let name = tag_text(code);
        let target = match ancestor_element(code, "a").and_then(href) {
            Some(value) => resolve_href(doc.reference(), value),
            None => {
                tracing::debug!(module = %name, "Module row without link");
                String::new()
            }
        };
        if class.is_some_and(|class| class.starts_with("cg-")) {
            ModuleRow::Submodule { name, target }
        } else {
            ModuleRow::Module { name, target }
        }
    }
}

/// Direct rows of a table, looking through row groups the parser inserts.
fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(child_elements(child, "tr")),
            _ => {}
        }
    }
    rows
}

impl<S: PageSource + ?Sized> TopicTreeBuilder<'_, S> {
    /// Group the terms of a glossary page below `parent` by first letter.
    ///
    /// Adds 27 buckets (`@`, `A` to `Z`) even when some stay empty. Terms
    /// starting with anything but a letter, after trimming spaces and
    /// underscores, go into `@`. Non-empty buckets then take the target of
    /// their first term.
    ///
    /// # Errors
    ///
    /// Returns [`SitemapError::Source`] if the page can't be loaded.
    pub fn add_glossary(&mut self, parent: &mut TopicNode, page: &str) -> Result<(), SitemapError> {
        let doc = self.source.load_document(page)?;
        tracing::debug!(page = doc.reference(), "Grouping glossary terms");
        self.registry.insert(doc.reference());

        let mut buckets: Vec<TopicNode> = bucket_labels()
            .map(|label| TopicNode::new(parent.level + 1, label.to_string(), ""))
            .collect();

        for term in doc.find_all(&TERM) {
            let link = find_first(term, &LINK);
            let name = match link {
                Some(link) => tag_text_excluding(term, link.id()),
                None => tag_text(term),
            };
            if name.is_empty() {
                tracing::warn!(page = doc.reference(), "Glossary term without text, skipping");
                continue;
            }
            let target = match link.and_then(href) {
                Some(value) => resolve_href(doc.reference(), value),
                None => match term.value().id() {
                    Some(id) => format!("{}#{id}", doc.reference()),
                    None => doc.reference().to_owned(),
                },
            };
            buckets[bucket_index(&name)].add_child(name, target);
        }

        let mut grouped = TopicNode::new(parent.level, "", "");
        grouped.children = buckets;
        grouped.adopt_first_child_targets();
        parent.children.extend(grouped.children);
        Ok(())
    }

    /// Group the module index table of `page` below `parent`.
    ///
    /// Letter rows become buckets, module rows become children of the current
    /// bucket and submodule rows (`cg-*` class) children of the current
    /// module.
    ///
    /// # Errors
    ///
    /// Returns [`SitemapError::MissingTable`] if the page has no module index
    /// table, or [`SitemapError::Source`] if it can't be loaded.
    pub fn add_module_index(
        &mut self,
        parent: &mut TopicNode,
        page: &str,
    ) -> Result<(), SitemapError> {
        let doc = self.source.load_document(page)?;
        tracing::debug!(page = doc.reference(), "Grouping module index");
        self.registry.insert(doc.reference());

        let Some(table) = doc.find_first(&MODULE_TABLE) else {
            return Err(SitemapError::MissingTable {
                page: doc.reference().to_owned(),
                table: "indextable modindextable",
            });
        };

        // Positions of the current bucket in `parent` and of the current
        // module in its container
        let mut bucket: Option<usize> = None;
        let mut module: Option<(Option<usize>, usize)> = None;

        for row in table_rows(table) {
            match ModuleRow::classify(&doc, row) {
                ModuleRow::Capital { label, target } => {
                    parent.add_child(label, target);
                    bucket = Some(parent.children.len() - 1);
                    module = None;
                }
                ModuleRow::Submodule { name, target } => match module {
                    Some((container, index)) => {
                        container_of(parent, container).children[index].add_child(name, target);
                    }
                    None => {
                        module = Some(add_module(parent, bucket, name, target));
                    }
                },
                ModuleRow::Module { name, target } => {
                    module = Some(add_module(parent, bucket, name, target));
                }
                ModuleRow::Other => {}
            }
        }
        Ok(())
    }
}

/// Add a module row below the current bucket, or below `parent` when no
/// letter row came first. Returns the module's position.
fn add_module(
    parent: &mut TopicNode,
    bucket: Option<usize>,
    name: String,
    target: String,
) -> (Option<usize>, usize) {
    if bucket.is_none() {
        tracing::warn!(module = %name, "Module row before any letter row");
    }
    let container = container_of(parent, bucket);
    container.add_child(name, target);
    (bucket, container.children.len() - 1)
}

fn container_of(parent: &mut TopicNode, bucket: Option<usize>) -> &mut TopicNode {
    match bucket {
        Some(index) => &mut parent.children[index],
        None => parent,
    }
}
