use std::path::Path;

use chm_config::Config;
use chm_project::{BuildError, ProjectBuilder};
use encoding_rs::WINDOWS_1252;
use pretty_assertions::assert_eq;

const CONFIG: &str = r#"
[source]
root = "html"

[project]
name = "pydoc"
title = "Python ${CHM_IT_UNSET_VERSION:-3.11} documentation"
compiled_file = "python311.chm"

[[chapters]]
name = "Python documentation total map"
target = "index.html"
kind = "leaf"

[[chapters]]
name = "Library reference"
target = "library/index.html"

[[chapters]]
name = "Glossary"
target = "glossary.html"
kind = "glossary"

[[chapters]]
name = "Global module index"
target = "py-modindex.html"
kind = "module-index"
"#;

const INDEX: &str = r#"<!DOCTYPE html>
<html><head><meta charset="utf-8" /><title>Python 3.11 documentation</title>
<script src="_static/doctools.js"></script></head>
<body><div class="document"><div class="bodywrapper"><div class="body">
<h1>Python 3.11 documentation</h1><p>Welcome – start here.</p>
</div></div><div class="sphinxsidebar"><p>sidebar</p></div></div></body></html>"#;

const LIBRARY: &str = r#"<!DOCTYPE html>
<html><head><meta charset="utf-8" /><title>The Python Standard Library — Python 3.11 documentation</title></head>
<body><div class="body">
<div class="toctree-wrapper compound"><ul>
<li class="toctree-l1"><a class="reference internal" href="os.html">os — Miscellaneous operating system interfaces</a></li>
<li class="toctree-l1"><a class="reference internal" href="os.html#files-and-directories">Files and Directories</a></li>
</ul></div></div></body></html>"#;

const OS: &str = r##"<!DOCTYPE html>
<html><head><meta charset="utf-8" /><title>os — Miscellaneous operating system interfaces — Python 3.11 documentation</title>
<link rel="stylesheet" href="../_static/pygments.css?v=1" type="text/css" /></head>
<body><div class="body"><h1>os — Miscellaneous operating system interfaces<a class="headerlink" href="#module-os">¶</a></h1></div>
<div class="sphinxsidebar" role="navigation"><div class="sphinxsidebarwrapper"><div>
<h3><a href="../contents.html">Table of Contents</a></h3>
<ul><li><a class="reference internal" href="#">os — Miscellaneous operating system interfaces</a><ul>
<li><a class="reference internal" href="#process-parameters">Process Parameters</a></li>
<li><a class="reference internal" href="#files-and-directories">Files and Directories</a></li>
</ul></li></ul></div></div></div></body></html>"##;

const GLOSSARY: &str = r##"<!DOCTYPE html>
<html><head><meta charset="utf-8" /><title>Glossary — Python 3.11 documentation</title></head>
<body><dl class="glossary">
<dt id="term-0"><code>&gt;&gt;&gt;</code><a class="headerlink" href="#term-0">¶</a></dt><dd>prompt</dd>
<dt id="term-bytecode">bytecode<a class="headerlink" href="#term-bytecode">¶</a></dt><dd>code</dd>
</dl></body></html>"##;

const MODINDEX: &str = r##"<!DOCTYPE html>
<html><head><meta charset="utf-8" /><title>Python Module Index — Python 3.11 documentation</title></head>
<body><div class="modindex-jumpbox"><a href="#cap-o"><strong>o</strong></a></div>
<table class="indextable modindextable">
<tr class="pcap"><td></td><td>&#160;</td><td></td></tr>
<tr class="cap" id="cap-o"><td></td><td><strong>o</strong></td><td></td></tr>
<tr><td></td><td><a href="library/os.html#module-os"><code class="xref">os</code></a></td><td><em>Miscellaneous operating system interfaces.</em></td></tr>
<tr class="cg-1"><td></td><td><a href="library/os.path.html#module-os.path"><code class="xref">os.path</code></a></td><td><em>Pathname manipulations.</em></td></tr>
</table></body></html>"##;

const GENINDEX: &str = r#"<!DOCTYPE html>
<html><head><meta charset="utf-8" /><title>Index — Python 3.11 documentation</title></head>
<body><table class="indextable genindextable"><tr><td><ul>
<li><a href="library/os.html#os.getcwd">getcwd() (in module os)</a></li>
<li>environment variable<ul>
<li><a href="library/os.html#envvar-HOME">HOME</a>, <a href="using/cmdline.html#envvar-HOME">[1]</a></li>
</ul></li>
</ul></td></tr></table></body></html>"#;

fn write(root: &Path, target: &str, content: &str) {
    let path = root.join(target);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn read_windows_1252(path: &Path) -> String {
    let bytes = std::fs::read(path).unwrap();
    let (text, _, had_errors) = WINDOWS_1252.decode(&bytes);
    assert!(!had_errors);
    text.into_owned()
}

fn load(dir: &Path) -> Config {
    Config::load(Some(dir.join("chm.toml").as_path()), None).unwrap()
}

fn corpus() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "chm.toml", CONFIG);
    let html = dir.path().join("html");
    write(&html, "index.html", INDEX);
    write(&html, "library/index.html", LIBRARY);
    write(&html, "library/os.html", OS);
    write(&html, "glossary.html", GLOSSARY);
    write(&html, "py-modindex.html", MODINDEX);
    write(&html, "genindex-all.html", GENINDEX);
    write(&html, "search.html", "<html><body><p>search</p></body></html>");
    write(&html, "_static/pygments.css", "pre { }");
    write(&html, "_images/logo.png", "png");
    dir
}

#[test]
fn test_build_writes_project() {
    let dir = corpus();
    let config = load(dir.path());

    let report = ProjectBuilder::new(&config).build().unwrap();

    assert_eq!(report.pages, 4);
    assert_eq!(report.normalized, 7);
    assert_eq!(report.assets, 2);
    assert_eq!(report.keywords, 3);
    assert_eq!(report.compiled, None);

    let html = dir.path().join("html");
    assert_eq!(report.contents_file, html.join("pydoc.hhc"));

    let contents = read_windows_1252(&report.contents_file);
    assert!(contents.contains("<!-- Sitemap 1.0 -->"));
    assert!(contents.contains(r#"<param name="Name" value="Library reference">"#));
    assert!(contents.contains(
        r#"<param name="Name" value="os — Miscellaneous operating system interfaces">"#
    ));
    assert!(contents.contains(
        r#"<param name="Local" value="library/os.html#process-parameters">"#
    ));
    assert!(contents.contains(r#"<param name="Name" value="&gt;&gt;&gt;">"#));
    assert!(contents.contains(r#"<param name="Local" value="glossary.html#term-bytecode">"#));
    assert!(contents.contains(r#"<param name="Local" value="library/os.path.html#module-os.path">"#));

    let index = read_windows_1252(&report.index_file);
    assert!(index.contains(r#"<param name="Keyword" value="getcwd() (in module os)">"#));
    assert!(index.contains(r#"<param name="See Also" value="environment variable">"#));
    assert!(index.contains(r#"<param name="Name" value="[1] using/cmdline.html#envvar-HOME">"#));

    let project = read_windows_1252(&report.project_file);
    assert!(project.contains("Title=Python 3.11 documentation\n"));
    assert!(project.contains("Compiled file=python311.chm\n"));
    assert!(project.contains("Contents file=pydoc.hhc\n"));
    assert!(project.contains(
        "[FILES]\n_images/logo.png\n_static/pygments.css\nlibrary/index.html\nlibrary/os.html\nglossary.html\npy-modindex.html\n"
    ));
}

#[test]
fn test_build_normalizes_every_page() {
    let dir = corpus();
    let config = load(dir.path());

    ProjectBuilder::new(&config).build().unwrap();

    let html = dir.path().join("html");
    let os = read_windows_1252(&html.join("library/os.html"));
    assert!(os.contains("<title>os — Miscellaneous operating system interfaces</title>"));
    assert!(os.contains("os &#8212; Miscellaneous operating system interfaces</h1>"));
    assert!(os.contains("pygments.css\""));
    assert!(!os.contains("sphinxsidebar"));

    let index = read_windows_1252(&html.join("index.html"));
    assert!(index.contains("Welcome &#8211; start here."));
    assert!(!index.contains("doctools.js"));
    assert!(!index.contains("bodywrapper"));

    let modindex = read_windows_1252(&html.join("py-modindex.html"));
    assert!(!modindex.contains("modindex-jumpbox"));

    let search = read_windows_1252(&html.join("search.html"));
    assert!(search.contains("X-UA-Compatible"));
}

#[test]
fn test_rebuild_over_normalized_tree() {
    let dir = corpus();
    let config = load(dir.path());
    let first = ProjectBuilder::new(&config).build().unwrap();
    let os_path = dir.path().join("html/library/os.html");
    let os = std::fs::read(&os_path).unwrap();

    let second = ProjectBuilder::new(&config).build().unwrap();

    assert_eq!(second.normalized, 0);
    assert_eq!(second.pages, first.pages);
    assert_eq!(second.keywords, first.keywords);
    assert_eq!(std::fs::read(&os_path).unwrap(), os);
    let contents = read_windows_1252(&second.contents_file);
    assert!(contents.contains(r#"<param name="Name" value="Library reference">"#));
    assert!(contents.contains(r#"<param name="Local" value="glossary.html#term-bytecode">"#));
    let index = read_windows_1252(&second.index_file);
    assert!(index.contains(r#"<param name="Name" value="[1] using/cmdline.html#envvar-HOME">"#));
}

#[test]
fn test_build_without_normalization_keeps_pages() {
    let dir = corpus();
    let mut config = load(dir.path());
    config.project.normalize = false;

    let report = ProjectBuilder::new(&config).build().unwrap();

    assert_eq!(report.normalized, 0);
    let os = std::fs::read_to_string(dir.path().join("html/library/os.html")).unwrap();
    assert_eq!(os, OS);
}

#[test]
fn test_structural_failure_writes_nothing() {
    let dir = corpus();
    let mut config = load(dir.path());
    config.chapters[0].kind = chm_config::ChapterKind::Pages;
    config.chapters[0].require_structure = true;

    let err = ProjectBuilder::new(&config).build().unwrap_err();

    assert!(matches!(err, BuildError::Sitemap(_)));
    assert_eq!(err.to_string(), "No toctree-wrapper or sphinxsidebarwrapper found in index.html");
    let html = dir.path().join("html");
    assert!(!html.join("pydoc.hhc").exists());
    assert!(!html.join("pydoc.hhp").exists());
    assert_eq!(std::fs::read_to_string(html.join("library/os.html")).unwrap(), OS);
}
