//! File discovery below the documentation root.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;

/// Lists the files of a documentation root as root-relative targets.
pub(crate) struct Scanner {
    root: PathBuf,
}

impl Scanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Every non-hidden file below the root, sorted.
    ///
    /// Returns an empty Vec if the root doesn't exist.
    pub fn scan(&self) -> Vec<String> {
        let mut files = Vec::new();
        if self.root.exists() {
            scan_directory(&self.root, "", &mut files);
        }
        files.sort();
        files
    }
}

fn scan_directory(dir_path: &Path, prefix: &str, files: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir_path) else {
        tracing::warn!(path = %dir_path.display(), "Failed to read directory, skipping");
        return;
    };

    for entry in entries.filter_map(Result::ok) {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let target = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            scan_directory(&entry.path(), &target, files);
        } else {
            files.push(target);
        }
    }
}

/// Targets of HTML pages.
pub(crate) fn html_pages(files: &[String]) -> impl Iterator<Item = &str> {
    files
        .iter()
        .map(String::as_str)
        .filter(|file| file.ends_with(".html"))
}

/// Targets matching any of `patterns`, in scan order.
pub(crate) fn matching<'a>(files: &'a [String], patterns: &[Pattern]) -> Vec<&'a str> {
    files
        .iter()
        .map(String::as_str)
        .filter(|file| patterns.iter().any(|pattern| pattern.matches(file)))
        .collect()
}
