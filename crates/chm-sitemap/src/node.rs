//! Sitemap node types.

/// One row of the table-of-contents tree.
///
/// The invisible super-root has level 0 and an empty name; it contributes no
/// row of its own but holds the first-level chapters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicNode {
    /// Depth in the tree; every child is one deeper than its parent.
    pub level: usize,
    /// Display text (empty for structural roots).
    pub name: String,
    /// Root-relative target, optionally with an anchor; empty if not navigable.
    pub target: String,
    /// Child rows in display order.
    pub children: Vec<TopicNode>,
}

impl TopicNode {
    /// Create the invisible super-root.
    #[must_use]
    pub fn root() -> Self {
        Self::new(0, String::new(), String::new())
    }

    /// Create a node at an explicit level.
    #[must_use]
    pub fn new(level: usize, name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            level,
            name: name.into(),
            target: target.into(),
            children: Vec::new(),
        }
    }

    /// Append a child one level deeper and return it.
    pub fn add_child(
        &mut self,
        name: impl Into<String>,
        target: impl Into<String>,
    ) -> &mut TopicNode {
        self.children
            .push(TopicNode::new(self.level + 1, name, target));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// First direct child with the given name.
    #[must_use]
    pub fn find_child(&self, name: &str) -> Option<&TopicNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Let every direct child that has children of its own take its first
    /// child's target. Children without children keep their target.
    pub fn adopt_first_child_targets(&mut self) {
        for child in &mut self.children {
            if let Some(first) = child.children.first() {
                child.target = first.target.clone();
            }
        }
    }

    /// Number of nodes in this subtree, excluding `self`.
    #[must_use]
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }

    /// Visit this node and all descendants depth-first, parents first.
    pub fn walk(&self, visit: &mut impl FnMut(&TopicNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// A location a keyword points to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    /// Root-relative target.
    pub target: String,
    /// 0-based position among the keyword's references, set for every
    /// reference after the first to tell them apart in the viewer.
    pub ordinal: Option<usize>,
}

impl Reference {
    /// Reference without ordinal label.
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ordinal: None,
        }
    }

    /// Reference labelled with its position.
    #[must_use]
    pub fn numbered(target: impl Into<String>, ordinal: usize) -> Self {
        Self {
            target: target.into(),
            ordinal: Some(ordinal),
        }
    }
}

/// One keyword of the index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeywordEntry {
    /// Display text; never empty.
    pub keyword: String,
    /// Locations in source order.
    pub references: Vec<Reference>,
    /// `false` for headings without a link of their own, rendered as
    /// "see also" entries.
    pub clickable: bool,
    /// Indented entries listed under this keyword.
    pub subentries: Vec<KeywordEntry>,
}

impl KeywordEntry {
    /// Clickable keyword with the given references.
    #[must_use]
    pub fn linked(keyword: impl Into<String>, references: Vec<Reference>) -> Self {
        Self {
            keyword: keyword.into(),
            references,
            clickable: true,
            subentries: Vec::new(),
        }
    }

    /// Heading without a link of its own.
    #[must_use]
    pub fn see_also(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            references: Vec::new(),
            clickable: false,
            subentries: Vec::new(),
        }
    }
}
