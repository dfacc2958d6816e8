//! HTML page access for the chm sitemap builder.
//!
//! This crate provides the collaborator capabilities the tree builders rely on:
//!
//! - [`Document`]: a parsed page together with its root-relative reference
//! - Structure queries over [`scraper::ElementRef`] (first/all by selector,
//!   non-recursive children, sibling and ancestor navigation, text extraction)
//! - Reference translation between page-relative hrefs, root-relative targets
//!   and filesystem paths
//! - [`decode_page`] for pages in UTF-8 or in the charset they declare
//! - [`PageSource`] trait for reading pages, with [`FsSource`] for a staged
//!   documentation root and [`MemorySource`] for tests (behind `mock` feature)
//!
//! # Reference Convention
//!
//! A *target* is always relative to the documentation root, uses `/` as the
//! separator and may carry an in-page anchor:
//! - `"index.html"` - root page
//! - `"library/cmd.html"` - nested page
//! - `"library/cmd.html#index-0"` - bookmark inside a page

mod charset;
mod document;
mod fs;
#[cfg(feature = "mock")]
mod mock;
pub mod query;
pub mod reference;
mod source;

pub use charset::decode_page;
pub use document::Document;
pub use fs::FsSource;
#[cfg(feature = "mock")]
pub use mock::MemorySource;
pub use source::{PageSource, SourceError, SourceErrorKind};

pub use scraper::{ElementRef, Selector};
