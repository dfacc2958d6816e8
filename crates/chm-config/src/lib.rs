//! Configuration management for chm.
//!
//! Parses `chm.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `project.title`
//! - `project.compiled_file`
//! - `compiler.command`
//!
//! ## Chapters
//!
//! The first level of the table of contents comes from `[[chapters]]`. Without
//! any, the layout of the Python documentation is used (see
//! [`default_chapters`]).

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the staged documentation root.
    pub source_root: Option<PathBuf>,
    /// Override the compiled file name.
    pub compiled_file: Option<String>,
    /// Run the help compiler after writing the project.
    pub compile: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "chm.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source configuration (paths are relative strings from TOML).
    source: SourceConfigRaw,
    /// Project settings.
    pub project: ProjectConfig,
    /// Template overrides (paths are relative strings from TOML).
    templates: TemplatesConfigRaw,
    /// External help compiler (optional section).
    pub compiler: Option<CompilerConfig>,
    /// First-level chapters of the table of contents.
    pub chapters: Vec<ChapterConfig>,

    /// Resolved source configuration (set after loading).
    #[serde(skip)]
    pub source_resolved: SourceConfig,
    /// Resolved template paths (set after loading).
    #[serde(skip)]
    pub templates_resolved: TemplatesConfig,
    /// Whether to run the compiler after writing the project.
    #[serde(skip)]
    pub compile: bool,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw source configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SourceConfigRaw {
    root: Option<String>,
    index_page: Option<String>,
}

/// Resolved source configuration with absolute paths.
#[derive(Debug, Default)]
pub struct SourceConfig {
    /// Staged documentation root; artifacts are written here too.
    pub root: PathBuf,
    /// Root-relative reference of the global keyword index page.
    pub index_page: String,
}

/// Project settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Base name of the `.hhc`, `.hhk` and `.hhp` files.
    pub name: String,
    /// Window title of the compiled help.
    pub title: String,
    /// Output file of the help compiler.
    pub compiled_file: String,
    /// Page shown when the help opens.
    pub default_topic: String,
    /// Charset of normalized pages and generated artifacts.
    pub charset: String,
    /// Separator before the suite suffix in page titles.
    pub title_separator: String,
    /// Whether pages are normalized for the help viewer.
    pub normalize: bool,
    /// Glob patterns (relative to the source root) of files listed in the
    /// project besides the pages.
    pub asset_patterns: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "pythondoc".to_owned(),
            title: "Python documentation".to_owned(),
            compiled_file: "python.chm".to_owned(),
            default_topic: "index.html".to_owned(),
            charset: "windows-1252".to_owned(),
            title_separator: "—".to_owned(),
            normalize: true,
            asset_patterns: vec!["_images/**/*".to_owned(), "_static/**/*".to_owned()],
        }
    }
}

impl ProjectConfig {
    /// File name of the contents sitemap (`pythondoc.hhc`).
    #[must_use]
    pub fn contents_file(&self) -> String {
        format!("{}.hhc", self.name)
    }

    /// File name of the index sitemap (`pythondoc.hhk`).
    #[must_use]
    pub fn index_file(&self) -> String {
        format!("{}.hhk", self.name)
    }

    /// File name of the project file (`pythondoc.hhp`).
    #[must_use]
    pub fn project_file(&self) -> String {
        format!("{}.hhp", self.name)
    }
}

/// Raw template configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TemplatesConfigRaw {
    contents: Option<String>,
    index: Option<String>,
    project: Option<String>,
}

/// Resolved template overrides. `None` selects the built-in template.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TemplatesConfig {
    /// `.hhc` template with a `{sitemap}` placeholder.
    pub contents: Option<PathBuf>,
    /// `.hhk` template with a `{sitemap}` placeholder.
    pub index: Option<PathBuf>,
    /// `.hhp` template.
    pub project: Option<PathBuf>,
}

/// External help compiler.
#[derive(Debug, Deserialize)]
pub struct CompilerConfig {
    /// Executable, called with the project file path as only argument.
    pub command: String,
    /// Exit codes meaning success (`hhc.exe` exits with 1 on success).
    #[serde(default = "default_success_codes")]
    pub success_codes: Vec<i32>,
}

fn default_success_codes() -> Vec<i32> {
    vec![1]
}

/// How a chapter gets its children.
#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ChapterKind {
    /// Expand outline lists and sidebar bookmarks of the target page.
    #[default]
    Pages,
    /// Add the target page without children.
    Leaf,
    /// Group glossary terms by first letter.
    Glossary,
    /// Group the module index table by first letter.
    ModuleIndex,
    /// Hold the configured child chapters; no page of its own.
    Group,
}

/// One configured table-of-contents entry.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ChapterConfig {
    /// Display name.
    pub name: String,
    /// Root-relative page reference.
    #[serde(default)]
    pub target: Option<String>,
    /// Expansion strategy.
    #[serde(default)]
    pub kind: ChapterKind,
    /// Fail if a page has no navigation markup.
    #[serde(default)]
    pub require_structure: bool,
    /// Child chapters of a group.
    #[serde(default)]
    pub children: Vec<ChapterConfig>,
}

impl ChapterConfig {
    /// Chapter pointing at `target`.
    #[must_use]
    pub fn new(name: &str, target: &str, kind: ChapterKind) -> Self {
        Self {
            name: name.to_owned(),
            target: Some(target.to_owned()),
            kind,
            require_structure: false,
            children: Vec::new(),
        }
    }

    /// Group of child chapters without a page of its own.
    #[must_use]
    pub fn group(name: &str, children: Vec<ChapterConfig>) -> Self {
        Self {
            name: name.to_owned(),
            target: None,
            kind: ChapterKind::Group,
            require_structure: false,
            children,
        }
    }

    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        require_non_empty(&self.name, &format!("{field}.name"))?;
        if self.kind == ChapterKind::Group {
            if self.children.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{field} ({}) is a group and needs children",
                    self.name
                )));
            }
            for (index, child) in self.children.iter().enumerate() {
                child.validate(&format!("{field}.children[{index}]"))?;
            }
            return Ok(());
        }

        match self.target.as_deref() {
            Some(target) => require_non_empty(target, &format!("{field}.target"))?,
            None => {
                return Err(ConfigError::Validation(format!(
                    "{field} ({}) needs a target",
                    self.name
                )));
            }
        }
        if !self.children.is_empty() {
            return Err(ConfigError::Validation(format!(
                "{field} ({}) has children but is not a group",
                self.name
            )));
        }
        Ok(())
    }
}

/// Table-of-contents layout of the Python documentation.
#[must_use]
pub fn default_chapters() -> Vec<ChapterConfig> {
    use ChapterKind::{Glossary, Leaf, ModuleIndex, Pages};

    vec![
        ChapterConfig::new("Python documentation total map", "index.html", Leaf),
        ChapterConfig::new("What’s new", "whatsnew/index.html", Pages),
        ChapterConfig::new("Setup and usage", "using/index.html", Pages),
        ChapterConfig::new("Tutorial", "tutorial/index.html", Pages),
        ChapterConfig::new("Language reference", "reference/index.html", Pages),
        ChapterConfig::new("Library reference", "library/index.html", Pages),
        ChapterConfig::new("Installing modules", "installing/index.html", Pages),
        ChapterConfig::new("Extending and embedding", "extending/index.html", Pages),
        ChapterConfig::new("Python/C API", "c-api/index.html", Pages),
        ChapterConfig::new("HOWTOs", "howto/index.html", Pages),
        ChapterConfig::new("FAQs", "faq/index.html", Pages),
        ChapterConfig::new("Glossary", "glossary.html", Glossary),
        ChapterConfig::new("Global module index", "py-modindex.html", ModuleIndex),
        ChapterConfig::group(
            "Project information",
            vec![
                ChapterConfig::new("About the documentation", "about.html", Leaf),
                ChapterConfig::new("History and license", "license.html", Pages),
                ChapterConfig::new("Copyright", "copyright.html", Leaf),
                ChapterConfig::new("Reporting issues", "bugs.html", Pages),
            ],
        ),
    ]
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`compiler.command`").
        field: String,
        /// Error message (e.g., "${`HHC`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `chm.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_root) = &settings.source_root {
            self.source_resolved.root.clone_from(source_root);
        }
        if let Some(compiled_file) = &settings.compiled_file {
            self.project.compiled_file.clone_from(compiled_file);
        }
        if let Some(compile) = settings.compile {
            self.compile = compile;
        }
    }

    /// Get the compiler configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the `[compiler]` section is missing
    /// or its command is empty.
    pub fn require_compiler(&self) -> Result<&CompilerConfig, ConfigError> {
        let compiler = self.compiler.as_ref().ok_or_else(|| {
            ConfigError::Validation("[compiler] section required to compile".into())
        })?;
        require_non_empty(&compiler.command, "compiler.command")?;
        Ok(compiler)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            source: SourceConfigRaw::default(),
            project: ProjectConfig::default(),
            templates: TemplatesConfigRaw::default(),
            compiler: None,
            chapters: default_chapters(),
            source_resolved: SourceConfig {
                root: base.join("html"),
                index_page: "genindex-all.html".to_owned(),
            },
            templates_resolved: TemplatesConfig::default(),
            compile: false,
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_project()?;
        require_non_empty(&self.source_resolved.index_page, "source.index_page")?;
        for (index, chapter) in self.chapters.iter().enumerate() {
            chapter.validate(&format!("chapters[{index}]"))?;
        }
        Ok(())
    }

    fn validate_project(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.project.name, "project.name")?;
        require_non_empty(&self.project.compiled_file, "project.compiled_file")?;
        require_non_empty(&self.project.default_topic, "project.default_topic")?;

        if encoding_rs::Encoding::for_label(self.project.charset.as_bytes()).is_none() {
            return Err(ConfigError::Validation(format!(
                "project.charset '{}' is not a known encoding",
                self.project.charset
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.project.title = expand::expand_env(&self.project.title, "project.title")?;
        self.project.compiled_file =
            expand::expand_env(&self.project.compiled_file, "project.compiled_file")?;

        if let Some(ref mut compiler) = self.compiler {
            compiler.command = expand::expand_env(&compiler.command, "compiler.command")?;
        }

        Ok(())
    }

    /// Resolve relative paths against the config directory and fill in the
    /// default chapter layout.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: &str| config_dir.join(path);

        self.source_resolved = SourceConfig {
            root: resolve(self.source.root.as_deref().unwrap_or("html")),
            index_page: self
                .source
                .index_page
                .clone()
                .unwrap_or_else(|| "genindex-all.html".to_owned()),
        };

        self.templates_resolved = TemplatesConfig {
            contents: self.templates.contents.as_deref().map(resolve),
            index: self.templates.index.as_deref().map(resolve),
            project: self.templates.project.as_deref().map(resolve),
        };

        if self.chapters.is_empty() {
            self.chapters = default_chapters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.source_resolved.root, PathBuf::from("/test/html"));
        assert_eq!(config.source_resolved.index_page, "genindex-all.html");
        assert_eq!(config.project.name, "pythondoc");
        assert_eq!(config.project.charset, "windows-1252");
        assert_eq!(config.project.title_separator, "—");
        assert!(config.project.normalize);
        assert!(!config.compile);
        assert!(config.compiler.is_none());
        assert_eq!(config.chapters, default_chapters());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.project.name, "pythondoc");
        assert_eq!(config.chapters, default_chapters());
    }

    #[test]
    fn test_artifact_file_names() {
        let toml = r#"
[project]
name = "py311"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.project.contents_file(), "py311.hhc");
        assert_eq!(config.project.index_file(), "py311.hhk");
        assert_eq!(config.project.project_file(), "py311.hhp");
        assert_eq!(config.project.compiled_file, "python.chm");
    }

    #[test]
    fn test_parse_compiler_defaults_success_codes() {
        let toml = r#"
[compiler]
command = "hhc.exe"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let compiler = config.require_compiler().unwrap();
        assert_eq!(compiler.command, "hhc.exe");
        assert_eq!(compiler.success_codes, vec![1]);
    }

    #[test]
    fn test_require_compiler_missing() {
        let config = Config::default_with_base(Path::new("/test"));
        let err = config.require_compiler().unwrap_err();
        assert!(err.to_string().contains("[compiler]"));
    }

    #[test]
    fn test_parse_chapters() {
        let toml = r#"
[[chapters]]
name = "Library reference"
target = "library/index.html"
require_structure = true

[[chapters]]
name = "Glossary"
target = "glossary.html"
kind = "glossary"

[[chapters]]
name = "Modules"
target = "py-modindex.html"
kind = "module-index"

[[chapters]]
name = "Project information"
kind = "group"
children = [
    { name = "About", target = "about.html", kind = "leaf" },
    { name = "Reporting issues", target = "bugs.html" },
]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.chapters.len(), 4);
        assert_eq!(config.chapters[0].kind, ChapterKind::Pages);
        assert!(config.chapters[0].require_structure);
        assert_eq!(config.chapters[1].kind, ChapterKind::Glossary);
        assert_eq!(config.chapters[2].kind, ChapterKind::ModuleIndex);
        assert_eq!(config.chapters[3].kind, ChapterKind::Group);
        assert_eq!(config.chapters[3].target, None);
        assert_eq!(
            config.chapters[3].children[1],
            ChapterConfig::new("Reporting issues", "bugs.html", ChapterKind::Pages)
        );
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[source]
root = "PydocCHM/3.11.9"

[templates]
contents = "chm_utils/pythondoc.hhc"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.source_resolved.root,
            PathBuf::from("/project/PydocCHM/3.11.9")
        );
        assert_eq!(
            config.templates_resolved,
            TemplatesConfig {
                contents: Some(PathBuf::from("/project/chm_utils/pythondoc.hhc")),
                index: None,
                project: None,
            }
        );
        assert_eq!(config.chapters, default_chapters());
    }

    #[test]
    fn test_validate_rejects_unknown_charset() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.project.charset = "klingon".to_owned();

        let err = config.validate().unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("klingon"));
    }

    #[test]
    fn test_validate_accepts_charset_aliases() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.project.charset = "cp1252".to_owned();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_group_needs_children() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.chapters = vec![ChapterConfig::group("Empty", Vec::new())];

        let err = config.validate().unwrap_err();

        assert!(err.to_string().contains("chapters[0] (Empty) is a group"));
    }

    #[test]
    fn test_validate_chapter_needs_target() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let mut chapter = ChapterConfig::new("Tutorial", "tutorial/index.html", ChapterKind::Pages);
        chapter.target = None;
        config.chapters = vec![ChapterConfig::group("Docs", vec![chapter])];

        let err = config.validate().unwrap_err();

        assert_eq!(
            err.to_string(),
            "Configuration error: chapters[0].children[0] (Tutorial) needs a target"
        );
    }

    #[test]
    fn test_validate_empty_project_name() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.project.name = String::new();

        let err = config.validate().unwrap_err();

        assert_eq!(err.to_string(), "Configuration error: project.name cannot be empty");
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            source_root: Some(PathBuf::from("/staged/3.12.0")),
            compile: Some(true),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.source_resolved.root, PathBuf::from("/staged/3.12.0"));
        assert!(config.compile);
        assert_eq!(config.project.compiled_file, "python.chm"); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.source_resolved.root, PathBuf::from("/test/html"));
        assert!(!config.compile);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chm.toml");
        std::fs::write(
            &path,
            r#"
[source]
root = "docs"
index_page = "genindex.html"

[project]
compiled_file = "${CHM_TEST_LOAD_UNSET:-python-3.11.9.chm}"
"#,
        )
        .unwrap();

        let overrides = CliSettings {
            compiled_file: Some("override.chm".to_owned()),
            ..Default::default()
        };
        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.source_resolved.root, dir.path().join("docs"));
        assert_eq!(config.source_resolved.index_page, "genindex.html");
        assert_eq!(config.project.compiled_file, "python-3.11.9.chm");
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));

        let config = Config::load(Some(&path), Some(&overrides)).unwrap();
        assert_eq!(config.project.compiled_file, "override.chm");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/chm.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_chapter_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chm.toml");
        std::fs::write(
            &path,
            "[[chapters]]\nname = \"X\"\ntarget = \"x.html\"\nkind = \"unknown\"\n",
        )
        .unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
