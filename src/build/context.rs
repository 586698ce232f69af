//! Build context containing configuration and state for a build.

use crate::build::BuildMode;
use crate::config::{PipelineConfig, StylepipeConfig};
use std::path::{Path, PathBuf};

/// Build context containing configuration and paths for a build operation.
///
/// The context provides access to all information needed to run pipelines:
/// the configuration, the project root and the build mode.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// The loaded configuration
    config: StylepipeConfig,
    /// Project root directory (where stylepipe.toml is located)
    project_root: PathBuf,
    /// Development or production
    mode: BuildMode,
    /// Whether to run in verbose mode
    verbose: bool,
}

impl BuildContext {
    /// Create a new build context.
    pub fn new(config: StylepipeConfig, project_root: PathBuf, mode: BuildMode) -> Self {
        Self { config, project_root, mode, verbose: false }
    }

    /// Get the configuration.
    pub fn config(&self) -> &StylepipeConfig {
        &self.config
    }

    /// Get the project root directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the build mode.
    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Whether verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Resolve a path relative to the project root.
    ///
    /// If the path is absolute, returns it unchanged.
    /// If relative, joins it with the project root.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    /// Absolute entry point of a pipeline.
    pub fn entry_path(&self, pipeline: &PipelineConfig) -> PathBuf {
        self.resolve_path(&pipeline.entry)
    }

    /// Absolute output directory of a pipeline.
    pub fn out_dir(&self, pipeline: &PipelineConfig) -> PathBuf {
        self.resolve_path(self.config.effective_out(pipeline))
    }

    /// Absolute path of a pipeline's compiled CSS.
    pub fn output_path(&self, pipeline: &PipelineConfig) -> PathBuf {
        self.out_dir(pipeline).join(pipeline.output_file_name())
    }

    /// Compiler load paths resolved against the project root.
    pub fn load_paths(&self) -> Vec<PathBuf> {
        self.config.compiler.load_paths.iter().map(|p| self.resolve_path(p)).collect()
    }

    /// Watch glob of a pipeline, anchored at the project root.
    ///
    /// The root is escaped so glob metacharacters in directory names match literally.
    pub fn watch_pattern(&self, pipeline: &PipelineConfig) -> String {
        let glob = pipeline.watch_glob();
        if Path::new(&glob).is_absolute() {
            glob
        } else {
            format!("{}/{}", glob::Pattern::escape(&self.project_root.to_string_lossy()), glob)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_config;

    fn context() -> BuildContext {
        BuildContext::new(default_config(), PathBuf::from("/project"), BuildMode::Production)
    }

    #[test]
    fn test_build_context_new() {
        let ctx = context();
        assert_eq!(ctx.project_root(), Path::new("/project"));
        assert_eq!(ctx.mode(), BuildMode::Production);
        assert!(!ctx.is_verbose());
        assert!(ctx.with_verbose(true).is_verbose());
    }

    #[test]
    fn test_resolve_path() {
        let ctx = context();
        assert_eq!(ctx.resolve_path(Path::new("/abs/path")), PathBuf::from("/abs/path"));
        assert_eq!(ctx.resolve_path(Path::new("rel/path")), PathBuf::from("/project/rel/path"));
    }

    #[test]
    fn test_pipeline_paths() {
        let ctx = context();
        let main = ctx.config().pipeline("main").unwrap().clone();

        assert_eq!(
            ctx.entry_path(&main),
            PathBuf::from("/project/ckanext/scss/assets/scss/main.scss")
        );
        assert_eq!(ctx.output_path(&main), PathBuf::from("/project/ckanext/scss/assets/css/main.css"));
        assert_eq!(ctx.watch_pattern(&main), "/project/ckanext/scss/assets/scss/**/*.scss");
        assert_eq!(ctx.load_paths(), vec![PathBuf::from("/project/node_modules")]);
    }

    #[test]
    fn test_watch_pattern_escapes_root() {
        let ctx = BuildContext::new(default_config(), PathBuf::from("/srv/site[v2]"), BuildMode::Production);
        let main = ctx.config().pipeline("main").unwrap().clone();

        let pattern = ctx.watch_pattern(&main);
        assert_eq!(pattern, "/srv/site[[]v2[]]/ckanext/scss/assets/scss/**/*.scss");
        let compiled = glob::Pattern::new(&pattern).unwrap();
        assert!(compiled.matches("/srv/site[v2]/ckanext/scss/assets/scss/partials/_a.scss"));
    }

    #[test]
    fn test_pipeline_out_override() {
        let ctx = context();
        let mut pipeline = PipelineConfig::new("scss/admin.scss");
        pipeline.out = Some(PathBuf::from("dist/admin"));
        assert_eq!(ctx.output_path(&pipeline), PathBuf::from("/project/dist/admin/admin.css"));
    }
}
