//! Configuration schema types for `stylepipe.toml`
//!
//! Defines the structure and validation rules for stylepipe project configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Source file extensions a pipeline entry may use
const ENTRY_EXTENSIONS: &[&str] = &["scss", "sass", "css"];

/// Browser compatibility presets accepted by `minify.compatibility`
pub const COMPATIBILITY_PRESETS: &[&str] = &["*", "ie11", "ie10", "ie9", "ie8", "ie7", "none"];

/// Where development-mode source maps are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceMapMode {
    /// Companion `<name>.css.map` file next to the CSS
    #[default]
    File,
    /// Base64 data URL appended to the CSS
    Inline,
}

/// Project metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    #[serde(default = "default_name")]
    pub name: String,
    /// Shared output directory for compiled CSS
    #[serde(default = "default_out")]
    pub out: PathBuf,
}

fn default_name() -> String {
    "stylepipe".to_string()
}

fn default_out() -> PathBuf {
    PathBuf::from("ckanext/scss/assets/css")
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self { name: default_name(), out: default_out() }
    }
}

/// SCSS compiler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Directories searched when resolving `@import`/`@use`
    #[serde(default = "default_load_paths")]
    pub load_paths: Vec<PathBuf>,
    /// Suppress `@warn` and `@debug` output
    #[serde(default)]
    pub quiet: bool,
}

fn default_load_paths() -> Vec<PathBuf> {
    vec![PathBuf::from("node_modules")]
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self { load_paths: default_load_paths(), quiet: false }
    }
}

/// Production-mode minification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinifyConfig {
    /// Optimization level: 0 whitespace only, 1 optimize, 2 also merge duplicate `@media`
    #[serde(default = "default_level")]
    pub level: u8,
    /// Browser compatibility preset
    #[serde(default = "default_compatibility")]
    pub compatibility: String,
}

fn default_level() -> u8 {
    2
}

fn default_compatibility() -> String {
    "*".to_string()
}

impl Default for MinifyConfig {
    fn default() -> Self {
        Self { level: default_level(), compatibility: default_compatibility() }
    }
}

/// Development-mode source map settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourceMapConfig {
    #[serde(default)]
    pub mode: SourceMapMode,
}

/// Watch mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Debounce delay in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u32,
    /// Clear terminal between rebuilds
    #[serde(default)]
    pub clear_screen: bool,
}

fn default_debounce_ms() -> u32 {
    100
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: default_debounce_ms(), clear_screen: false }
    }
}

/// A single entry point and the steps applied to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root stylesheet compiled by this pipeline
    pub entry: PathBuf,
    /// Glob of files that trigger a rebuild in watch mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch: Option<String>,
    /// Merge identical `@media` blocks and sort them mobile-first
    #[serde(default)]
    pub sort_media_queries: bool,
    /// Output directory (overrides `project.out`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out: Option<PathBuf>,
}

impl PipelineConfig {
    /// Create a pipeline for an entry point with default settings.
    pub fn new(entry: impl Into<PathBuf>) -> Self {
        Self { entry: entry.into(), watch: None, sort_media_queries: false, out: None }
    }

    /// Watch glob, falling back to every `.scss` file under the entry's directory.
    pub fn watch_glob(&self) -> String {
        match &self.watch {
            Some(glob) => glob.clone(),
            None => {
                let dir = self.entry.parent().unwrap_or_else(|| Path::new(""));
                if dir.as_os_str().is_empty() {
                    "**/*.scss".to_string()
                } else {
                    format!("{}/**/*.scss", dir.display())
                }
            }
        }
    }

    /// File name of the compiled stylesheet (`main.scss` -> `main.css`).
    pub fn output_file_name(&self) -> String {
        let stem = self
            .entry
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "style".to_string());
        format!("{}.css", stem)
    }
}

/// Complete stylepipe.toml configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StylepipeConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub compiler: CompilerConfig,
    #[serde(default)]
    pub minify: MinifyConfig,
    #[serde(default)]
    pub source_map: SourceMapConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    /// Pipelines keyed by name
    #[serde(default)]
    pub pipelines: BTreeMap<String, PipelineConfig>,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "pipelines.main.entry")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stylepipe.toml: '{}' {}", self.field, self.message)
    }
}

impl StylepipeConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.pipelines.is_empty() {
            errors.push(ConfigValidationError {
                field: "pipelines".to_string(),
                message: "must define at least one pipeline".to_string(),
            });
        }

        for (name, pipeline) in &self.pipelines {
            if pipeline.entry.as_os_str().is_empty() {
                errors.push(ConfigValidationError {
                    field: format!("pipelines.{}.entry", name),
                    message: "must be a non-empty path".to_string(),
                });
            } else {
                let ext = pipeline.entry.extension().and_then(|e| e.to_str()).unwrap_or("");
                if !ENTRY_EXTENSIONS.contains(&ext) {
                    errors.push(ConfigValidationError {
                        field: format!("pipelines.{}.entry", name),
                        message: format!("must end in one of: {}", ENTRY_EXTENSIONS.join(", ")),
                    });
                }
            }

            if let Some(ref pattern) = pipeline.watch {
                if let Err(e) = glob::Pattern::new(pattern) {
                    errors.push(ConfigValidationError {
                        field: format!("pipelines.{}.watch", name),
                        message: format!("is not a valid glob: {}", e),
                    });
                }
            }
        }

        if self.minify.level > 2 {
            errors.push(ConfigValidationError {
                field: "minify.level".to_string(),
                message: "must be 0, 1 or 2".to_string(),
            });
        }

        if !COMPATIBILITY_PRESETS.contains(&self.minify.compatibility.as_str()) {
            errors.push(ConfigValidationError {
                field: "minify.compatibility".to_string(),
                message: format!("must be one of: {}", COMPATIBILITY_PRESETS.join(", ")),
            });
        }

        if self.watch.debounce_ms == 0 {
            errors.push(ConfigValidationError {
                field: "watch.debounce_ms".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Look up a pipeline by name
    pub fn pipeline(&self, name: &str) -> Option<&PipelineConfig> {
        self.pipelines.get(name)
    }

    /// Effective output directory for a pipeline (pipeline-specific or shared)
    pub fn effective_out<'a>(&'a self, pipeline: &'a PipelineConfig) -> &'a Path {
        pipeline.out.as_deref().unwrap_or(&self.project.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_parse() {
        let toml = r#"
[pipelines.main]
entry = "scss/main.scss"
"#;
        let config: StylepipeConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.project.out, PathBuf::from("ckanext/scss/assets/css"));
        assert_eq!(config.compiler.load_paths, vec![PathBuf::from("node_modules")]);
        assert_eq!(config.minify.level, 2);
        assert_eq!(config.minify.compatibility, "*");
        assert_eq!(config.source_map.mode, SourceMapMode::File);
        assert_eq!(config.watch.debounce_ms, 100);

        let main = config.pipeline("main").unwrap();
        assert_eq!(main.entry, PathBuf::from("scss/main.scss"));
        assert!(!main.sort_media_queries);
        assert!(config.is_valid());
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[project]
name = "ckanext-scss"
out = "dist/css"

[compiler]
load_paths = ["node_modules", "vendor/scss"]
quiet = true

[minify]
level = 1
compatibility = "ie11"

[source_map]
mode = "inline"

[watch]
debounce_ms = 250
clear_screen = true

[pipelines.main]
entry = "assets/scss/main.scss"
watch = "assets/scss/**/*.scss"
sort_media_queries = true

[pipelines.admin]
entry = "assets/admin/admin.scss"
out = "dist/admin"
"#;
        let config: StylepipeConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.project.name, "ckanext-scss");
        assert_eq!(config.project.out, PathBuf::from("dist/css"));
        assert_eq!(config.compiler.load_paths.len(), 2);
        assert!(config.compiler.quiet);
        assert_eq!(config.minify.level, 1);
        assert_eq!(config.minify.compatibility, "ie11");
        assert_eq!(config.source_map.mode, SourceMapMode::Inline);
        assert_eq!(config.watch.debounce_ms, 250);
        assert!(config.watch.clear_screen);

        let names: Vec<_> = config.pipelines.keys().cloned().collect();
        assert_eq!(names, vec!["admin", "main"]);

        let main = config.pipeline("main").unwrap();
        assert!(main.sort_media_queries);
        assert_eq!(config.effective_out(main), Path::new("dist/css"));

        let admin = config.pipeline("admin").unwrap();
        assert_eq!(config.effective_out(admin), Path::new("dist/admin"));
        assert!(config.is_valid());
    }

    #[test]
    fn test_validation_no_pipelines() {
        let config: StylepipeConfig = toml::from_str("").unwrap();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "pipelines"));
    }

    #[test]
    fn test_validation_bad_entry_extension() {
        let toml = r#"
[pipelines.main]
entry = "assets/main.less"
"#;
        let config: StylepipeConfig = toml::from_str(toml).unwrap();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "pipelines.main.entry"));
    }

    #[test]
    fn test_validation_bad_watch_glob() {
        let toml = r#"
[pipelines.main]
entry = "assets/main.scss"
watch = "assets/[**"
"#;
        let config: StylepipeConfig = toml::from_str(toml).unwrap();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "pipelines.main.watch"));
    }

    #[test]
    fn test_validation_minify_settings() {
        let toml = r#"
[minify]
level = 3
compatibility = "netscape"

[pipelines.main]
entry = "assets/main.scss"
"#;
        let config: StylepipeConfig = toml::from_str(toml).unwrap();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "minify.level"));
        assert!(errors.iter().any(|e| e.field == "minify.compatibility"));
    }

    #[test]
    fn test_validation_error_display() {
        let error = ConfigValidationError {
            field: "minify.level".to_string(),
            message: "must be 0, 1 or 2".to_string(),
        };
        assert_eq!(error.to_string(), "stylepipe.toml: 'minify.level' must be 0, 1 or 2");
    }

    #[test]
    fn test_watch_glob_default() {
        let pipeline = PipelineConfig::new("assets/scss/main.scss");
        assert_eq!(pipeline.watch_glob(), "assets/scss/**/*.scss");

        let bare = PipelineConfig::new("main.scss");
        assert_eq!(bare.watch_glob(), "**/*.scss");

        let explicit = PipelineConfig { watch: Some("styles/**/*".to_string()), ..bare };
        assert_eq!(explicit.watch_glob(), "styles/**/*");
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(PipelineConfig::new("assets/scss/main.scss").output_file_name(), "main.css");
        assert_eq!(PipelineConfig::new("theme.sass").output_file_name(), "theme.css");
    }
}
