//! Navigation structures for HTML Help (`.chm`) projects.
//!
//! This crate turns the navigation markup of a Sphinx-generated documentation
//! tree into the two sitemaps an HTML Help project needs:
//!
//! - [`TopicTreeBuilder`]: table-of-contents tree from outline lists and
//!   sidebar bookmarks, plus the glossary and module-index groupings
//! - [`build_keyword_index`]: keyword entries from the global index page
//! - [`render_contents`] / [`render_index`]: the `.hhc` / `.hhk` sitemap text
//! - [`escape`]: markup and non-ASCII escaping for the single-byte charset the
//!   help viewer expects
//!
//! Every page the tree builders visit is recorded in a [`NormalizedPages`]
//! registry that later passes use to avoid processing a page twice.
//!
//! # Example
//!
//! ```ignore
//! use chm_html::FsSource;
//! use chm_sitemap::{TopicNode, TopicTreeBuilder, render_contents};
//!
//! let source = FsSource::new("html");
//! let mut builder = TopicTreeBuilder::new(&source);
//! let mut root = TopicNode::root();
//! let library = root.add_child("Library reference", "library/index.html");
//! builder.build_subtree(library, "library/index.html", false)?;
//!
//! let hhc = render_contents(&root);
//! let pages = builder.into_registry();
//! ```

mod error;
pub mod escape;
mod grouper;
mod keyword;
mod node;
mod registry;
mod serialize;
mod topic;

pub use error::SitemapError;
pub use escape::escape;
pub use keyword::build_keyword_index;
pub use node::{KeywordEntry, Reference, TopicNode};
pub use registry::NormalizedPages;
pub use serialize::{render_contents, render_index};
pub use topic::TopicTreeBuilder;
