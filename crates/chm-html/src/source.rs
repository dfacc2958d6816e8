//! Page source trait and error types.
//!
//! Provides the [`PageSource`] trait the tree builders read pages through,
//! along with [`SourceError`] for unified error handling across backends.

use std::path::PathBuf;

use crate::document::Document;

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
pub enum SourceErrorKind {
    /// Page does not exist.
    NotFound,
    /// Reference is empty, absolute, external or escapes the root.
    InvalidReference,
    /// Page exists but could not be read or decoded.
    Io,
}

/// Error returned when a page cannot be loaded.
#[derive(Debug)]
pub struct SourceError {
    /// Semantic error category.
    pub kind: SourceErrorKind,
    /// Reference that was requested.
    pub reference: String,
    /// Filesystem path context (if applicable).
    pub path: Option<PathBuf>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SourceError {
    /// Create a new source error for a reference.
    #[must_use]
    pub fn new(kind: SourceErrorKind, reference: impl Into<String>) -> Self {
        Self {
            kind,
            reference: reference.into(),
            path: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(reference: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::NotFound, reference)
    }

    /// Create a source error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, reference: impl Into<String>, path: PathBuf) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => SourceErrorKind::NotFound,
            _ => SourceErrorKind::Io,
        };
        Self::new(kind, reference).with_path(path).with_source(err)
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "Kind: message (page: ref, path: /foo/bar)"
        let kind_str = match self.kind {
            SourceErrorKind::NotFound => "Page not found",
            SourceErrorKind::InvalidReference => "Invalid page reference",
            SourceErrorKind::Io => "Cannot read page",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        write!(f, " (page: {}", self.reference)?;
        if let Some(path) = &self.path {
            write!(f, ", path: {}", path.display())?;
        }
        write!(f, ")")
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Read access to the pages of one documentation root.
///
/// All references are root-relative targets (see the crate docs). An anchor
/// suffix is ignored when loading.
pub trait PageSource {
    /// Read the raw HTML of a page.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the page doesn't exist or can't be read.
    fn load(&self, reference: &str) -> Result<String, SourceError>;

    /// Read and parse a page.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the page doesn't exist or can't be read.
    fn load_document(&self, reference: &str) -> Result<Document, SourceError> {
        let (page, _) = crate::reference::split_anchor(reference);
        let source = self.load(page)?;
        Ok(Document::parse(page, &source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_reference_and_path() {
        let err = SourceError::io(
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            "library/index.html",
            PathBuf::from("/docs/library/index.html"),
        );
        assert_eq!(err.kind, SourceErrorKind::NotFound);
        let message = err.to_string();
        assert!(message.starts_with("Page not found"));
        assert!(message.contains("page: library/index.html"));
        assert!(message.contains("/docs/library/index.html"));
    }

    #[test]
    fn test_io_kind_mapping() {
        let err = SourceError::io(
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            "a.html",
            PathBuf::from("/docs/a.html"),
        );
        assert_eq!(err.kind, SourceErrorKind::Io);
        assert!(std::error::Error::source(&err).is_some());
    }
}
