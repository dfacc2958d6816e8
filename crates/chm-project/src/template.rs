//! Templates of the `.hhc`, `.hhk` and `.hhp` artifacts.
//!
//! Templates contain `{name}` placeholders. The sitemap templates take
//! `{sitemap}`; the project template takes `{title}`, `{compiled_file}`,
//! `{contents_file}`, `{index_file}`, `{default_topic}` and `{files}`.

use std::path::Path;

use chm_config::TemplatesConfig;
use encoding_rs::Encoding;

use crate::error::BuildError;

/// Header shared by both sitemap files.
const SITEMAP_HEAD: &str = "<!DOCTYPE HTML PUBLIC \"-//IETF//DTD HTML//EN\">\n\
<HTML>\n\
<HEAD>\n\
<meta name=\"GENERATOR\" content=\"Microsoft&reg; HTML Help Workshop 4.1\">\n\
<!-- Sitemap 1.0 -->\n\
</HEAD><BODY>\n";

/// Built-in `.hhc` template.
#[must_use]
pub fn default_contents_template() -> String {
    let mut text = String::from(SITEMAP_HEAD);
    text.push_str("<OBJECT type=\"text/site properties\">\n");
    text.push_str("\t<param name=\"Window Styles\" value=\"0x800025\">\n");
    text.push_str("\t<param name=\"ImageType\" value=\"Folder\">\n");
    text.push_str("</OBJECT>\n");
    text.push_str("{sitemap}\n");
    text.push_str("</BODY></HTML>\n");
    text
}

/// Built-in `.hhk` template.
#[must_use]
pub fn default_index_template() -> String {
    let mut text = String::from(SITEMAP_HEAD);
    text.push_str("{sitemap}\n");
    text.push_str("</BODY></HTML>\n");
    text
}

/// Built-in `.hhp` template.
#[must_use]
pub fn default_project_template() -> String {
    let mut text = String::with_capacity(512);
    text.push_str("[OPTIONS]\n");
    text.push_str("Binary TOC=Yes\n");
    text.push_str("Binary Index=Yes\n");
    text.push_str("Compatibility=1.1 or later\n");
    text.push_str("Compiled file={compiled_file}\n");
    text.push_str("Contents file={contents_file}\n");
    text.push_str("Index file={index_file}\n");
    text.push_str("Default topic={default_topic}\n");
    text.push_str("Display compile progress=No\n");
    text.push_str("Full-text search=Yes\n");
    text.push_str("Language=0x409 English (United States)\n");
    text.push_str("Title={title}\n");
    text.push_str("\n[FILES]\n{files}\n\n[INFOTYPES]\n");
    text
}

/// The three artifact templates of a project.
#[derive(Debug, Clone)]
pub struct Templates {
    pub contents: String,
    pub index: String,
    pub project: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            contents: default_contents_template(),
            index: default_index_template(),
            project: default_project_template(),
        }
    }
}

impl Templates {
    /// Load configured template files, falling back to the built-in ones.
    ///
    /// Files are decoded with `encoding`, the charset artifacts are written in.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Io`] if a configured template can't be read.
    pub fn load(config: &TemplatesConfig, encoding: &'static Encoding) -> Result<Self, BuildError> {
        let load = |path: Option<&Path>, fallback: fn() -> String| match path {
            Some(path) => read_template(path, encoding),
            None => Ok(fallback()),
        };
        Ok(Self {
            contents: load(config.contents.as_deref(), default_contents_template)?,
            index: load(config.index.as_deref(), default_index_template)?,
            project: load(config.project.as_deref(), default_project_template)?,
        })
    }
}

fn read_template(path: &Path, encoding: &'static Encoding) -> Result<String, BuildError> {
    let bytes = std::fs::read(path).map_err(|e| BuildError::io(e, path))?;
    let (text, _, _) = encoding.decode(&bytes);
    tracing::debug!(path = %path.display(), "Loaded template");
    Ok(text.into_owned())
}

/// Substitute `{name}` placeholders with `values`.
///
/// Braces around anything that isn't one of the given names are kept
/// verbatim, so templates may contain literal braces.
#[must_use]
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                result.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                result.push('{');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fill_known_placeholders() {
        assert_eq!(
            fill("Title={title}\nFile={compiled_file}", &[
                ("title", "Python 3.11.9"),
                ("compiled_file", "python3119.chm"),
            ]),
            "Title=Python 3.11.9\nFile=python3119.chm"
        );
    }

    #[test]
    fn test_fill_keeps_unknown_braces() {
        assert_eq!(
            fill("a { b } {missing} {sitemap} {", &[("sitemap", "<UL>")]),
            "a { b } {missing} <UL> {"
        );
    }

    #[test]
    fn test_fill_does_not_rescan_values() {
        assert_eq!(fill("{a}", &[("a", "{b}"), ("b", "x")]), "{b}");
    }

    #[test]
    fn test_default_project_template_placeholders() {
        let text = fill(&default_project_template(), &[
            ("title", "Python documentation"),
            ("compiled_file", "python.chm"),
            ("contents_file", "pythondoc.hhc"),
            ("index_file", "pythondoc.hhk"),
            ("default_topic", "index.html"),
            ("files", "index.html\nlibrary/os.html"),
        ]);
        assert!(text.contains("Compiled file=python.chm\n"));
        assert!(text.contains("Contents file=pythondoc.hhc\n"));
        assert!(text.contains("[FILES]\nindex.html\nlibrary/os.html\n"));
        assert!(!text.contains('{'));
    }

    #[test]
    fn test_default_sitemap_templates() {
        let contents = fill(&default_contents_template(), &[("sitemap", "<UL>\n</UL>")]);
        assert!(contents.contains("<!-- Sitemap 1.0 -->"));
        assert!(contents.contains("text/site properties"));
        assert!(contents.ends_with("<UL>\n</UL>\n</BODY></HTML>\n"));

        let index = fill(&default_index_template(), &[("sitemap", "<UL>\n</UL>")]);
        assert!(!index.contains("text/site properties"));
    }

    #[test]
    fn test_load_configured_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pythondoc.hhc");
        // "é" in windows-1252
        std::fs::write(&path, b"<HTML>\xe9{sitemap}</HTML>").unwrap();
        let config = TemplatesConfig {
            contents: Some(path),
            ..Default::default()
        };

        let templates = Templates::load(&config, encoding_rs::WINDOWS_1252).unwrap();

        assert_eq!(templates.contents, "<HTML>é{sitemap}</HTML>");
        assert_eq!(templates.index, default_index_template());
    }

    #[test]
    fn test_load_missing_template() {
        let config = TemplatesConfig {
            project: Some("/nonexistent/pythondoc.hhp".into()),
            ..Default::default()
        };

        let err = Templates::load(&config, encoding_rs::WINDOWS_1252).unwrap_err();

        assert!(matches!(err, BuildError::Io { .. }));
    }
}
