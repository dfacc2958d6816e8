//! Filesystem page source.

use std::fs;
use std::path::PathBuf;

use crate::charset::decode_page;
use crate::reference::{split_anchor, target_to_path};
use crate::source::{PageSource, SourceError, SourceErrorKind};

/// Pages read from a staged documentation root on disk.
///
/// Pages are decoded as UTF-8, which is what the documentation generator
/// emits, or in the charset they declare once rewritten for the help viewer.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    /// Create a source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Filesystem path a reference maps to.
    #[must_use]
    pub fn path_of(&self, reference: &str) -> PathBuf {
        target_to_path(&self.root, reference)
    }
}

/// Reject references that cannot name a page below the root.
fn validate_reference(reference: &str) -> Result<(), SourceError> {
    let invalid = reference.is_empty()
        || reference.starts_with('/')
        || reference.contains('\\')
        || reference.contains("://")
        || reference.split('/').any(|segment| segment == "..");
    if invalid {
        return Err(SourceError::new(
            SourceErrorKind::InvalidReference,
            reference,
        ));
    }
    Ok(())
}

impl PageSource for FsSource {
    fn load(&self, reference: &str) -> Result<String, SourceError> {
        let (page, _) = split_anchor(reference);
        validate_reference(page)?;
        let path = self.path_of(page);
        tracing::debug!(page, path = %path.display(), "Loading page");
        let bytes = fs::read(&path).map_err(|e| SourceError::io(e, page, path.clone()))?;
        match decode_page(&bytes) {
            Some(text) => Ok(text.into_owned()),
            None => Err(SourceError::io(
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "not UTF-8 and no known charset declared",
                ),
                page,
                path,
            )),
        }
    }
}
