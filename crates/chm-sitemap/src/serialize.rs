//! Sitemap text for the `.hhc` contents file and the `.hhk` index file.
//!
//! Each entry is an `<OBJECT type="text/sitemap">` inside an `<LI>`, children
//! are wrapped in `<UL>`. Every line is indented by two spaces per nesting
//! step. Names and keywords are only syntax-escaped since the contents pane
//! renders character references literally; targets get both escapes.

use crate::escape::escape;
use crate::node::{KeywordEntry, Reference, TopicNode};

const INDENT: &str = "  ";
const ITEM_OPEN: &str = r#"<LI> <OBJECT type="text/sitemap">"#;
const ITEM_CLOSE: &str = "</OBJECT>";

/// Accumulates indented sitemap lines.
#[derive(Default)]
struct Lines {
    lines: Vec<String>,
}

impl Lines {
    fn push(&mut self, depth: usize, line: &str) {
        self.lines.push(format!("{}{line}", INDENT.repeat(depth)));
    }

    fn param(&mut self, depth: usize, name: &str, value: &str) {
        self.push(depth, &format!(r#"<param name="{name}" value="{value}">"#));
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

/// Render a topic tree as `.hhc` sitemap text.
///
/// Nodes without a name only contribute their children, so rendering the
/// invisible root yields a single top-level `<UL>`.
#[must_use]
pub fn render_contents(root: &TopicNode) -> String {
    let mut lines = Lines::default();
    write_topic(&mut lines, root, 0);
    lines.finish()
}

fn write_topic(lines: &mut Lines, node: &TopicNode, depth: usize) {
    if !node.name.is_empty() {
        lines.push(depth, ITEM_OPEN);
        lines.param(depth + 1, "Name", &escape(&node.name, true, false));
        lines.param(depth + 1, "Local", &escape(&node.target, true, true));
        lines.push(depth, ITEM_CLOSE);
    }
    if !node.children.is_empty() {
        lines.push(depth, "<UL>");
        for child in &node.children {
            write_topic(lines, child, depth + 1);
        }
        lines.push(depth, "</UL>");
    }
}

/// Render keyword entries as `.hhk` sitemap text.
#[must_use]
pub fn render_index(entries: &[KeywordEntry]) -> String {
    let mut lines = Lines::default();
    lines.push(0, "<UL>");
    for entry in entries {
        write_keyword(&mut lines, entry, 1);
    }
    lines.push(0, "</UL>");
    lines.finish()
}

fn write_keyword(lines: &mut Lines, entry: &KeywordEntry, depth: usize) {
    let keyword = escape(&entry.keyword, true, false);
    lines.push(depth, ITEM_OPEN);
    lines.param(depth + 1, "Keyword", &keyword);

    match entry.references.as_slice() {
        [] => lines.param(depth + 1, "See Also", &keyword),
        _ if !entry.clickable => lines.param(depth + 1, "See Also", &keyword),
        [single] => lines.param(depth + 1, "Local", &escape(&single.target, true, true)),
        references => {
            for reference in references {
                let name = escape(&reference.target, true, false);
                lines.param(depth + 1, "Name", &reference_label(reference, &name));
                lines.param(depth + 1, "Local", &escape(&reference.target, true, true));
            }
        }
    }
    lines.push(depth, ITEM_CLOSE);

    if !entry.subentries.is_empty() {
        lines.push(depth, "<UL>");
        for subentry in &entry.subentries {
            write_keyword(lines, subentry, depth + 1);
        }
        lines.push(depth, "</UL>");
    }
}

/// Label shown in the topic chooser for one of several references.
fn reference_label(reference: &Reference, target: &str) -> String {
    match reference.ordinal {
        Some(ordinal) => format!("[{ordinal}] {target}"),
        None => target.to_owned(),
    }
}
