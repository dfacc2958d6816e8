//! Project build errors.

use std::path::{Path, PathBuf};

use chm_config::ConfigError;
use chm_html::SourceError;
use chm_sitemap::SitemapError;

use crate::compiler::CompileError;
use crate::normalize::NormalizeError;

/// Error returned by [`ProjectBuilder`](crate::ProjectBuilder).
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Invalid or incomplete configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Navigation structures could not be built.
    #[error(transparent)]
    Sitemap(#[from] SitemapError),
    /// A page could not be loaded.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// A page could not be normalized.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    /// The help compiler failed.
    #[error(transparent)]
    Compile(#[from] CompileError),
    /// The configured charset is not supported.
    #[error("Unknown charset: {0}")]
    UnknownCharset(String),
    /// An asset pattern is not a valid glob.
    #[error("Invalid asset pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    /// Reading a template or writing an artifact failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    pub(crate) fn io(source: std::io::Error, path: &Path) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
