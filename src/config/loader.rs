//! Configuration loading and discovery for `stylepipe.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::{PipelineConfig, ProjectConfig, StylepipeConfig};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file looked up by `find_config`
pub const CONFIG_FILE_NAME: &str = "stylepipe.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse stylepipe.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override the shared output directory
    pub out: Option<PathBuf>,
}

/// Find stylepipe.toml by walking up from the current working directory.
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find stylepipe.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a stylepipe.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration.
pub fn load_config(path: Option<&Path>) -> Result<StylepipeConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(default_config()),
    }
}

/// Load configuration from a specific file path.
pub fn load_config_file(path: &Path) -> Result<StylepipeConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse and validate configuration text.
pub fn parse_config(contents: &str) -> Result<StylepipeConfig, ConfigError> {
    let config: StylepipeConfig = toml::from_str(contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Create a default configuration when no stylepipe.toml is found.
///
/// Mirrors the CKAN extension layout: one `main` pipeline compiling
/// `ckanext/scss/assets/scss/main.scss` with media-query sorting.
pub fn default_config() -> StylepipeConfig {
    let project_name = env::current_dir()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "unnamed".to_string());

    let mut pipelines = BTreeMap::new();
    pipelines.insert(
        "main".to_string(),
        PipelineConfig {
            entry: PathBuf::from("ckanext/scss/assets/scss/main.scss"),
            watch: Some("ckanext/scss/assets/scss/**/*.scss".to_string()),
            sort_media_queries: true,
            out: None,
        },
    );

    StylepipeConfig {
        project: ProjectConfig { name: project_name, ..ProjectConfig::default() },
        pipelines,
        ..StylepipeConfig::default()
    }
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut StylepipeConfig, overrides: &CliOverrides) {
    if let Some(ref out) = overrides.out {
        config.project.out = out.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_from_walks_up() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "").unwrap();
        let nested = temp.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();

        let found = find_config_from(nested).unwrap();
        assert_eq!(found, temp.path().join(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_load_config_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"
[project]
name = "demo"

[pipelines.main]
entry = "scss/main.scss"
sort_media_queries = true
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.project.name, "demo");
        assert!(config.pipeline("main").unwrap().sort_media_queries);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Some(Path::new("/nonexistent/stylepipe.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_parse_config_invalid_toml() {
        let result = parse_config("[pipelines.main\nentry = 1");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_parse_config_validation_errors() {
        let result = parse_config(
            r#"
[minify]
level = 9
"#,
        );
        match result {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("minify.level")));
                assert!(errors.iter().any(|e| e.contains("'pipelines'")));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_config() {
        let config = default_config();
        assert!(config.is_valid());
        let main = config.pipeline("main").unwrap();
        assert_eq!(main.entry, PathBuf::from("ckanext/scss/assets/scss/main.scss"));
        assert!(main.sort_media_queries);
        assert_eq!(config.project.out, PathBuf::from("ckanext/scss/assets/css"));
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = default_config();
        merge_cli_overrides(&mut config, &CliOverrides { out: Some(PathBuf::from("dist")) });
        assert_eq!(config.project.out, PathBuf::from("dist"));

        merge_cli_overrides(&mut config, &CliOverrides::default());
        assert_eq!(config.project.out, PathBuf::from("dist"));
    }
}
