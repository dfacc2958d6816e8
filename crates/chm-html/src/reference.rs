//! Translation between hrefs, root-relative targets and filesystem paths.
//!
//! Every target recorded in a sitemap goes through [`resolve_href`], so a link
//! discovered in `whatsnew/index.html` as `3.11.html` and the same page linked
//! from the root as `whatsnew/3.11.html` end up as identical strings.

use std::path::{Component, Path, PathBuf};

/// Split a target into its page part and optional anchor (without `#`).
///
/// ```
/// use chm_html::reference::split_anchor;
///
/// assert_eq!(split_anchor("library/cmd.html#index-0"), ("library/cmd.html", Some("index-0")));
/// assert_eq!(split_anchor("library/cmd.html"), ("library/cmd.html", None));
/// ```
#[must_use]
pub fn split_anchor(target: &str) -> (&str, Option<&str>) {
    match target.split_once('#') {
        Some((page, anchor)) => (page, Some(anchor)),
        None => (target, None),
    }
}

/// Check whether a target points at a bookmark inside a page.
#[must_use]
pub fn has_anchor(target: &str) -> bool {
    target.contains('#')
}

/// Resolve an href found on `page` into a root-relative target.
///
/// - `""` stays empty (a link without destination)
/// - `"#frag"` is appended to the page itself (replacing any anchor on `page`)
/// - `"/a/b.html"` is taken relative to the documentation root
/// - external URLs (`scheme:` prefix) are returned unchanged
/// - anything else is joined onto the directory containing `page`, with `.`
///   and `..` segments folded away
///
/// Backslashes are treated as separators so the result never contains one.
#[must_use]
pub fn resolve_href(page: &str, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }
    if is_external(href) {
        return href.to_owned();
    }

    let href = href.replace('\\', "/");
    let (page_path, _) = split_anchor(page);

    if href.starts_with('#') {
        return format!("{page_path}{href}");
    }

    let (href_path, anchor) = split_anchor(&href);
    let joined = if let Some(rooted) = href_path.strip_prefix('/') {
        rooted.to_owned()
    } else {
        match page_path.replace('\\', "/").rsplit_once('/') {
            Some((dir, _)) => format!("{dir}/{href_path}"),
            None => href_path.to_owned(),
        }
    };

    let normalized = normalize_segments(&joined);
    match anchor {
        Some(anchor) => format!("{normalized}#{anchor}"),
        None => normalized,
    }
}

/// Fold `.` and `..` segments and drop empty ones.
///
/// `..` at the root is discarded rather than escaping the documentation root.
fn normalize_segments(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Check for a URL scheme such as `https:` or `mailto:`.
#[must_use]
pub fn is_external(href: &str) -> bool {
    let Some((scheme, _)) = href.split_once(':') else {
        return false;
    };
    !scheme.is_empty()
        && scheme.len() > 1
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Map a target onto the filesystem below `root`.
///
/// The anchor (if any) is dropped since it does not name a file.
#[must_use]
pub fn target_to_path(root: &Path, target: &str) -> PathBuf {
    let (page, _) = split_anchor(target);
    page.split('/')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}

/// Map a file below `root` back onto a target.
///
/// Returns `None` if `path` is not inside `root` or contains non-normal
/// components (`..`, prefixes).
#[must_use]
pub fn path_to_target(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => segments.push(name.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(segments.join("/"))
}
