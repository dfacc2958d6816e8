//! HTML Help project generation.
//!
//! Drives a conversion of a staged Sphinx HTML tree into an HTML Help project:
//!
//! 1. Collect the table of contents from the configured chapters and the
//!    keyword index from the global index page ([`ProjectBuilder::collect`])
//! 2. Write the `.hhc` and `.hhk` sitemaps through their templates
//! 3. Normalize every page for the help viewer ([`PageNormalizer`])
//! 4. Write the `.hhp` project file listing pages and assets
//! 5. Optionally run the help compiler ([`Compiler`])
//!
//! # Example
//!
//! ```ignore
//! use chm_config::Config;
//! use chm_project::ProjectBuilder;
//!
//! let config = Config::load(None, None)?;
//! let report = ProjectBuilder::new(&config).build()?;
//! println!("{} topics, {} keywords", report.topics, report.keywords);
//! ```

mod builder;
mod compiler;
mod error;
mod normalize;
mod scanner;
mod template;

pub use builder::{BuildReport, ProjectBuilder, Sitemaps};
pub use compiler::{CompileError, Compiler};
pub use error::BuildError;
pub use normalize::{NormalizeError, PageNormalizer};
pub use template::{
    Templates, default_contents_template, default_index_template, default_project_template, fill,
};
