//! Page cleanup for the help viewer.
//!
//! Sphinx pages carry navigation chrome (sidebars, related bars, footers,
//! permalink markers) and scripts the embedded viewer can't use. The viewer
//! also expects a single-byte charset, so every non-ASCII character of the
//! page becomes a character reference except in `<title>`, which the viewer
//! shows verbatim.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chm_html::decode_page;
use chm_html::reference::target_to_path;
use chm_sitemap::escape;
use ego_tree::NodeId;
use encoding_rs::Encoding;
use regex::{Captures, Regex};
use scraper::{Html, Selector};

/// Elements removed from every page.
static REMOVED: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "head script",
        r#"head link[rel="search"]"#,
        "div.mobile-nav",
        r#"div.related[role="navigation"]"#,
        "div.sphinxsidebar",
        "div.footer",
        "a.headerlink",
        "div.modindex-jumpbox",
    ]
    .iter()
    .map(|css| Selector::parse(css).unwrap())
    .collect()
});
static UNWRAPPED: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.bodywrapper").unwrap());
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("head title").unwrap());

static HEAD_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<head(\s[^>]*)?>").unwrap());
static CHARSET_META: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+charset\s*=\s*"?utf-8"?\s*/?>"#).unwrap());
static CONTENT_TYPE_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(<meta[^>]*content="[^"]*charset=)utf-8"#).unwrap());
static LINK_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<link\b[^>]*>").unwrap());
static HREF_QUERY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(href="[^"?]*)\?[^"]*""#).unwrap());

const COMPATIBILITY_META: &str = r#"<meta http-equiv="X-UA-Compatible" content="IE=edge">"#;

/// Whether `page` was already rewritten by [`PageNormalizer`].
fn is_normalized(page: &[u8]) -> bool {
    page.windows(COMPATIBILITY_META.len())
        .any(|window| window == COMPATIBILITY_META.as_bytes())
}

/// Error returned when a page can't be normalized.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// The page could not be read or decoded.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The normalized page could not be written back.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Rewrites pages for the help viewer.
#[derive(Debug, Clone)]
pub struct PageNormalizer {
    encoding: &'static Encoding,
    title_separator: String,
}

impl PageNormalizer {
    /// Create a normalizer writing pages in `encoding`.
    ///
    /// Titles are cut at the last `title_separator` (`"Page — Suite"`
    /// becomes `"Page"`); an empty separator keeps titles whole.
    pub fn new(encoding: &'static Encoding, title_separator: impl Into<String>) -> Self {
        Self {
            encoding,
            title_separator: title_separator.into(),
        }
    }

    /// Normalize the page `target` below `root` in place.
    ///
    /// Pages that already carry the compatibility meta were rewritten by an
    /// earlier run and are left untouched. Returns whether the page was
    /// rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError`] if the file can't be read, decoded or
    /// written.
    pub fn normalize_file(&self, root: &Path, target: &str) -> Result<bool, NormalizeError> {
        let path = target_to_path(root, target);
        let raw = std::fs::read(&path).map_err(|source| NormalizeError::Read {
            path: path.clone(),
            source,
        })?;
        if is_normalized(&raw) {
            tracing::debug!(page = target, "Already normalized, skipping");
            return Ok(false);
        }
        let Some(source) = decode_page(&raw) else {
            return Err(NormalizeError::Read {
                path,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "not UTF-8 and no known charset declared",
                ),
            });
        };
        let bytes = self.normalize(&source);
        std::fs::write(&path, bytes).map_err(|source| NormalizeError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(page = target, "Normalized");
        Ok(true)
    }

    /// Normalize a page and encode it in the page charset.
    ///
    /// The result starts its head with the compatibility meta, which marks
    /// the page as normalized for [`normalize_file`](Self::normalize_file).
    #[must_use]
    pub fn normalize(&self, source: &str) -> Vec<u8> {
        let mut html = Html::parse_document(source);
        let title = self.page_title(&html);
        strip_chrome(&mut html);

        let serialized = self.rewrite_head(&html.html());
        let escaped = escape(&serialized, false, true);
        let text = match title {
            Some(title) => replace_title(&escaped, &escape(&title, true, false)),
            None => escaped.into_owned(),
        };

        let (bytes, _, _) = self.encoding.encode(&text);
        bytes.into_owned()
    }

    /// Title text without the suite suffix.
    fn page_title(&self, html: &Html) -> Option<String> {
        let title: String = html.select(&TITLE).next()?.text().collect();
        let title = match self.title_separator.as_str() {
            "" => title.as_str(),
            separator => title.rsplit_once(separator).map_or(title.as_str(), |(page, _)| page),
        };
        Some(title.trim().to_owned())
    }

    /// Charset declarations, compatibility meta and stylesheet cache busters.
    fn rewrite_head(&self, text: &str) -> String {
        let charset = self.encoding.name();
        let text = HEAD_OPEN.replace(text, |caps: &Captures<'_>| {
            format!("{}{COMPATIBILITY_META}", &caps[0])
        });
        let text = CHARSET_META.replace(&text, format!(r#"<meta charset="{charset}">"#));
        let text = CONTENT_TYPE_CHARSET.replace(&text, format!("${{1}}{charset}"));
        LINK_TAG
            .replace_all(&text, |caps: &Captures<'_>| {
                let tag = &caps[0];
                if tag.contains(r#"rel="stylesheet""#) {
                    HREF_QUERY.replace(tag, r#"$1""#).into_owned()
                } else {
                    tag.to_owned()
                }
            })
            .into_owned()
    }
}

/// Remove navigation chrome and unwrap `div.bodywrapper`.
fn strip_chrome(html: &mut Html) {
    let removed: Vec<NodeId> = REMOVED
        .iter()
        .flat_map(|selector| html.select(selector).map(|element| element.id()))
        .collect();
    for id in removed {
        if let Some(mut node) = html.tree.get_mut(id) {
            node.detach();
        }
    }

    let wrappers: Vec<NodeId> = html.select(&UNWRAPPED).map(|element| element.id()).collect();
    for id in wrappers {
        let Some(wrapper) = html.tree.get(id) else {
            continue;
        };
        if wrapper.parent().is_none() {
            continue;
        }
        let children: Vec<NodeId> = wrapper.children().map(|child| child.id()).collect();
        if let Some(mut wrapper) = html.tree.get_mut(id) {
            for child in children {
                wrapper.insert_id_before(child);
            }
            wrapper.detach();
        }
    }
}

/// Replace the content of the first `<title>` element.
fn replace_title(text: &str, title: &str) -> String {
    const OPEN: &str = "<title>";
    const CLOSE: &str = "</title>";
    let Some(start) = text.find(OPEN) else {
        return text.to_owned();
    };
    let content_start = start + OPEN.len();
    let Some(length) = text[content_start..].find(CLOSE) else {
        return text.to_owned();
    };
    let mut result = String::with_capacity(text.len());
    result.push_str(&text[..content_start]);
    result.push_str(title);
    result.push_str(&text[content_start + length..]);
    result
}
