//! Escaping for text embedded in HTML Help artifacts.
//!
//! The help compiler and viewer work in a single-byte charset (cp1252 for
//! English documentation). Two independent transforms make arbitrary Unicode
//! safe to embed:
//!
//! - **Syntax escaping**: `<`, `>`, `&`, `"` and `'` become named entities.
//!   Quotes use `&quot;` / `&apos;`: runs of `&#x27;` make the compiler fail.
//! - **Non-ASCII escaping**: every code point above 127 becomes a decimal
//!   character reference (`&#8217;`).
//!
//! Titles and sitemap name slots only get syntax escaping: the viewer renders
//! cp1252 glyphs natively there but mangles character references.

use std::borrow::Cow;

/// Escape `text` for embedding in an HTML Help artifact.
///
/// With both flags set, syntax escaping runs first. With neither set, the
/// input is returned as-is.
///
/// ```
/// use chm_sitemap::escape;
///
/// assert_eq!(escape("a < b", true, false), "a &lt; b");
/// assert_eq!(escape("What’s new", false, true), "What&#8217;s new");
/// assert_eq!(escape("‘x’ & y", true, true), "&#8216;x&#8217; &amp; y");
/// ```
#[must_use]
pub fn escape(text: &str, escape_syntax: bool, escape_non_ascii: bool) -> Cow<'_, str> {
    let text = if escape_syntax {
        escape_markup(text)
    } else {
        Cow::Borrowed(text)
    };
    if !escape_non_ascii {
        return text;
    }
    match text {
        Cow::Borrowed(borrowed) => escape_code_points(borrowed),
        Cow::Owned(owned) if owned.is_ascii() => Cow::Owned(owned),
        Cow::Owned(owned) => Cow::Owned(escape_code_points(&owned).into_owned()),
    }
}

/// Replace markup-significant characters with named entities.
fn escape_markup(text: &str) -> Cow<'_, str> {
    if !text.contains(['<', '>', '&', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut result = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Replace code points above 127 with decimal character references.
///
/// ASCII runs between them are copied as whole slices.
fn escape_code_points(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        return Cow::Borrowed(text);
    }
    let mut result = String::with_capacity(text.len() + text.len() / 2);
    let mut run_start: Option<usize> = None;
    for (pos, c) in text.char_indices() {
        if c.is_ascii() {
            run_start.get_or_insert(pos);
            continue;
        }
        if let Some(start) = run_start.take() {
            result.push_str(&text[start..pos]);
        }
        result.push_str("&#");
        result.push_str(&u32::from(c).to_string());
        result.push(';');
    }
    if let Some(start) = run_start {
        result.push_str(&text[start..]);
    }
    Cow::Owned(result)
}
