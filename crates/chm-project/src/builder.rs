//! Project build pipeline.
//!
//! Navigation is collected completely before anything is written, so a
//! structural failure leaves the documentation root untouched.

use std::path::{Path, PathBuf};

use chm_config::{ChapterConfig, ChapterKind, Config};
use chm_html::{FsSource, PageSource};
use chm_sitemap::{
    KeywordEntry, NormalizedPages, TopicNode, TopicTreeBuilder, build_keyword_index,
    render_contents, render_index,
};
use encoding_rs::Encoding;
use glob::Pattern;

use crate::compiler::Compiler;
use crate::error::BuildError;
use crate::normalize::PageNormalizer;
use crate::scanner::{Scanner, html_pages, matching};
use crate::template::{Templates, fill};

/// Navigation structures of one documentation tree.
#[derive(Debug)]
pub struct Sitemaps {
    /// Invisible root of the table of contents.
    pub contents: TopicNode,
    /// Keyword index entries in document order.
    pub index: Vec<KeywordEntry>,
    /// Pages visited while building the table of contents.
    pub pages: NormalizedPages,
}

impl Sitemaps {
    /// Number of table-of-contents entries below the root.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.contents.descendant_count()
    }

    /// Number of keyword entries, sub-entries included.
    #[must_use]
    pub fn keyword_count(&self) -> usize {
        self.index
            .iter()
            .map(|entry| 1 + entry.subentries.len())
            .sum()
    }
}

/// Summary of a finished build.
#[derive(Debug)]
pub struct BuildReport {
    pub topics: usize,
    pub keywords: usize,
    /// Pages listed in the project.
    pub pages: usize,
    /// Pages rewritten by the normalizer.
    pub normalized: usize,
    /// Asset files listed in the project.
    pub assets: usize,
    pub contents_file: PathBuf,
    pub index_file: PathBuf,
    pub project_file: PathBuf,
    /// Exit code of the help compiler, if it ran.
    pub compiled: Option<i32>,
}

/// Builds an HTML Help project in the configured documentation root.
pub struct ProjectBuilder<'a> {
    config: &'a Config,
}

impl<'a> ProjectBuilder<'a> {
    #[must_use]
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Collect the navigation structures from the documentation root.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if a page is missing or lacks required markup.
    pub fn collect(&self) -> Result<Sitemaps, BuildError> {
        let source = FsSource::new(&self.config.source_resolved.root);
        self.collect_from(&source)
    }

    /// Collect the navigation structures from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if a page is missing or lacks required markup.
    pub fn collect_from<S: PageSource + ?Sized>(&self, source: &S) -> Result<Sitemaps, BuildError> {
        let mut builder = TopicTreeBuilder::new(source);
        let mut contents = TopicNode::root();
        for chapter in &self.config.chapters {
            add_chapter(&mut builder, &mut contents, chapter)?;
        }

        let index_page = source.load_document(&self.config.source_resolved.index_page)?;
        let index = build_keyword_index(&index_page)?;

        Ok(Sitemaps {
            contents,
            index,
            pages: builder.into_registry(),
        })
    }

    /// Write the project files, normalize pages and optionally compile.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if collecting, writing, normalizing or
    /// compiling fails.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let project = &self.config.project;
        let root = &self.config.source_resolved.root;

        let encoding = Encoding::for_label(project.charset.as_bytes())
            .ok_or_else(|| BuildError::UnknownCharset(project.charset.clone()))?;
        let patterns = compile_patterns(&project.asset_patterns)?;
        let compiler = if self.config.compile {
            Some(Compiler::from_config(self.config.require_compiler()?))
        } else {
            None
        };
        let templates = Templates::load(&self.config.templates_resolved, encoding)?;

        let sitemaps = self.collect()?;
        tracing::info!(
            topics = sitemaps.topic_count(),
            keywords = sitemaps.keyword_count(),
            pages = sitemaps.pages.len(),
            "Collected navigation"
        );

        let contents_file = root.join(project.contents_file());
        let contents = render_contents(&sitemaps.contents);
        let contents = fill(&templates.contents, &[("sitemap", contents.as_str())]);
        write_encoded(&contents_file, &contents, encoding)?;

        let index_file = root.join(project.index_file());
        let index = render_index(&sitemaps.index);
        let index = fill(&templates.index, &[("sitemap", index.as_str())]);
        write_encoded(&index_file, &index, encoding)?;

        let files = Scanner::new(root).scan();
        let normalized = if project.normalize {
            normalize_pages(
                &PageNormalizer::new(encoding, project.title_separator.as_str()),
                root,
                &sitemaps.pages,
                &files,
            )?
        } else {
            0
        };

        let assets = matching(&files, &patterns);
        let listed: Vec<&str> = assets
            .iter()
            .copied()
            .chain(sitemaps.pages.iter())
            .collect();
        let project_file = root.join(project.project_file());
        let contents_name = project.contents_file();
        let index_name = project.index_file();
        let file_list = listed.join("\n");
        let project_text = fill(&templates.project, &[
            ("title", project.title.as_str()),
            ("compiled_file", project.compiled_file.as_str()),
            ("contents_file", contents_name.as_str()),
            ("index_file", index_name.as_str()),
            ("default_topic", project.default_topic.as_str()),
            ("files", file_list.as_str()),
        ]);
        write_encoded(&project_file, &project_text, encoding)?;

        let compiled = match compiler {
            Some(compiler) => Some(compiler.compile(&project_file)?),
            None => None,
        };

        Ok(BuildReport {
            topics: sitemaps.topic_count(),
            keywords: sitemaps.keyword_count(),
            pages: sitemaps.pages.len(),
            normalized,
            assets: assets.len(),
            contents_file,
            index_file,
            project_file,
            compiled,
        })
    }
}

/// Add `chapter` below `parent` and expand it per its kind.
fn add_chapter<S: PageSource + ?Sized>(
    builder: &mut TopicTreeBuilder<'_, S>,
    parent: &mut TopicNode,
    chapter: &ChapterConfig,
) -> Result<(), BuildError> {
    let target = chapter.target.as_deref().unwrap_or_default();
    tracing::debug!(chapter = %chapter.name, target, kind = ?chapter.kind, "Adding chapter");
    let node = parent.add_child(chapter.name.as_str(), target);

    match chapter.kind {
        ChapterKind::Leaf => {}
        ChapterKind::Pages => builder.build_subtree(node, target, chapter.require_structure)?,
        ChapterKind::Glossary => builder.add_glossary(node, target)?,
        ChapterKind::ModuleIndex => builder.add_module_index(node, target)?,
        ChapterKind::Group => {
            for child in &chapter.children {
                add_chapter(builder, node, child)?;
            }
        }
    }
    Ok(())
}

/// Normalize registry pages, then every other HTML page once.
fn normalize_pages(
    normalizer: &PageNormalizer,
    root: &Path,
    registry: &NormalizedPages,
    files: &[String],
) -> Result<usize, BuildError> {
    let mut count = 0;
    let pages = registry
        .iter()
        .chain(html_pages(files).filter(|page| !registry.contains(page)));
    for page in pages {
        if normalizer.normalize_file(root, page)? {
            count += 1;
        }
    }
    tracing::info!(pages = count, "Normalized pages");
    Ok(count)
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>, BuildError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|source| BuildError::Pattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

fn write_encoded(path: &Path, text: &str, encoding: &'static Encoding) -> Result<(), BuildError> {
    let (bytes, _, _) = encoding.encode(text);
    std::fs::write(path, bytes).map_err(|e| BuildError::io(e, path))?;
    tracing::info!(path = %path.display(), "Wrote");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chm_html::MemorySource;
    use chm_sitemap::SitemapError;
    use pretty_assertions::assert_eq;

    const GENINDEX: &str = r#"<html><body>
<table class="indextable genindextable"><tr><td><ul>
<li><a href="library/os.html#os.getcwd">getcwd() (in module os)</a></li>
</ul></td></tr></table>
</body></html>"#;

    fn config(chapters: Vec<ChapterConfig>) -> Config {
        let mut config = Config::default();
        config.chapters = chapters;
        config
    }

    fn source() -> MemorySource {
        MemorySource::new()
            .with_page("genindex-all.html", GENINDEX)
            .with_page(
                "library/index.html",
                r#"<html><body><div class="toctree-wrapper compound"><ul>
<li class="toctree-l1"><a class="reference internal" href="os.html">os</a></li>
</ul></div></body></html>"#,
            )
            .with_page("library/os.html", "<html><body><h1>os</h1></body></html>")
            .with_page(
                "glossary.html",
                r##"<html><body><dl class="glossary">
<dt id="term-bytecode">bytecode<a class="headerlink" href="#term-bytecode">¶</a></dt>
</dl></body></html>"##,
            )
            .with_page(
                "py-modindex.html",
                r##"<html><body><table class="indextable modindextable">
<tr class="cap" id="cap-o"><td></td><td><strong>o</strong></td></tr>
<tr><td></td><td><a href="library/os.html#module-os"><code class="xref">os</code></a></td></tr>
</table></body></html>"##,
            )
    }

    #[test]
    fn test_collect_dispatches_chapter_kinds() {
        use ChapterKind::{Glossary, Leaf, ModuleIndex, Pages};

        let config = config(vec![
            ChapterConfig::new("Overview", "index.html", Leaf),
            ChapterConfig::new("Library reference", "library/index.html", Pages),
            ChapterConfig::group("Indices", vec![
                ChapterConfig::new("Glossary", "glossary.html", Glossary),
                ChapterConfig::new("Global module index", "py-modindex.html", ModuleIndex),
            ]),
        ]);

        let sitemaps = ProjectBuilder::new(&config)
            .collect_from(&source())
            .unwrap();

        let root = &sitemaps.contents;
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.children[0].target, "index.html");
        assert!(root.children[0].children.is_empty());

        let library = &root.children[1];
        assert_eq!(library.children[0].name, "os");
        assert_eq!(library.children[0].target, "library/os.html");

        let indices = &root.children[2];
        assert_eq!(indices.target, "");
        assert_eq!(indices.level, 1);
        let glossary = &indices.children[0];
        assert_eq!(glossary.children.len(), 27);
        let b = glossary.find_child("B").unwrap();
        assert_eq!(b.target, "glossary.html#term-bytecode");
        let modules = &indices.children[1];
        assert_eq!(modules.children[0].name, "O");
        assert_eq!(modules.children[0].children[0].target, "library/os.html#module-os");

        assert_eq!(sitemaps.pages.iter().collect::<Vec<_>>(), vec![
            "library/index.html",
            "library/os.html",
            "glossary.html",
            "py-modindex.html",
        ]);
        assert_eq!(sitemaps.index.len(), 1);
        assert_eq!(sitemaps.index[0].keyword, "getcwd() (in module os)");
        assert_eq!(sitemaps.keyword_count(), 1);
    }

    #[test]
    fn test_leaf_chapter_not_loaded() {
        let config = config(vec![ChapterConfig::new(
            "Overview",
            "index.html",
            ChapterKind::Leaf,
        )]);
        let source = source();

        let sitemaps = ProjectBuilder::new(&config).collect_from(&source).unwrap();

        assert_eq!(sitemaps.topic_count(), 1);
        assert!(sitemaps.pages.is_empty());
        assert_eq!(source.loads(), vec!["genindex-all.html"]);
    }

    #[test]
    fn test_required_structure_fails_collect() {
        let mut chapter = ChapterConfig::new("OS", "library/os.html", ChapterKind::Pages);
        chapter.require_structure = true;
        let config = config(vec![chapter]);

        let err = ProjectBuilder::new(&config)
            .collect_from(&source())
            .unwrap_err();

        assert!(matches!(
            err,
            BuildError::Sitemap(SitemapError::Structure { ref page }) if page == "library/os.html"
        ));
    }

    #[test]
    fn test_missing_index_page() {
        let config = config(Vec::new());
        let source = MemorySource::new();

        let err = ProjectBuilder::new(&config)
            .collect_from(&source)
            .unwrap_err();

        assert!(matches!(err, BuildError::Source(_)));
    }

    #[test]
    fn test_invalid_asset_pattern() {
        let err = compile_patterns(&["_static/[".to_owned()]).unwrap_err();
        assert!(matches!(err, BuildError::Pattern { ref pattern, .. } if pattern == "_static/["));
    }

    #[test]
    fn test_build_fails_before_writing_when_compiler_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(Vec::new());
        config.source_resolved.root = dir.path().to_path_buf();
        config.compile = true;

        let err = ProjectBuilder::new(&config).build().unwrap_err();

        assert!(matches!(err, BuildError::Config(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
