//! Page decoding.
//!
//! Pages come from the documentation generator as UTF-8. Pages already
//! rewritten for the help viewer are in a single-byte charset and declare it
//! in a `<meta>` tag, which is read to decode them again.

use std::borrow::Cow;

use encoding_rs::Encoding;

/// Bytes searched for a charset declaration.
const SNIFF_LIMIT: usize = 1024;

/// Decode page bytes as UTF-8, falling back to the charset the page declares.
///
/// Returns `None` when the bytes are not UTF-8 and no known charset is
/// declared.
///
/// ```
/// use chm_html::decode_page;
///
/// let page = b"<meta charset=\"windows-1252\"><title>A \x97 B</title>";
/// assert!(decode_page(page).unwrap().contains("A \u{2014} B"));
/// assert!(decode_page(b"\xff\xfe").is_none());
/// ```
#[must_use]
pub fn decode_page(bytes: &[u8]) -> Option<Cow<'_, str>> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some(Cow::Borrowed(text));
    }
    let encoding = declared_charset(bytes)?;
    tracing::debug!(charset = encoding.name(), "Decoding page in declared charset");
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    Some(text)
}

/// Charset named by the first `charset=` in the head of the page.
fn declared_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(SNIFF_LIMIT)];
    let start = head
        .windows(b"charset=".len())
        .position(|window| window.eq_ignore_ascii_case(b"charset="))?
        + b"charset=".len();
    let label: Vec<u8> = head[start..]
        .iter()
        .skip_while(|&&b| b == b'"' || b == b'\'')
        .take_while(|&&b| !matches!(b, b'"' | b'\'' | b' ' | b'/' | b'>' | b';'))
        .copied()
        .collect();
    Encoding::for_label(&label)
}
