//! Pipeline runner.
//!
//! One [`StylePipeline`] compiles one entry point: locate, compile, post-process,
//! finish, write, touch. Compile and CSS failures are logged and reported in
//! the result; only failures to write output are returned as errors.

use crate::build::{BuildContext, BuildMode, PipelineResult};
use crate::compile::{CompileError, ScssCompiler};
use crate::config::PipelineConfig;
use crate::css::{
    self, compatibility_targets, CssError, FinishedCss, Finisher, MinifyLevel, ProcessOptions,
};
use crate::output::{map_path, touch, write_atomic};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info};

/// Error that stops a pipeline run from completing.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No pipeline with this name in the configuration
    #[error("Unknown pipeline '{0}'")]
    UnknownPipeline(String),
    /// Output could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Worker pool could not be created
    #[error("Failed to start build workers: {0}")]
    ThreadPool(String),
}

/// Failure inside the transformation steps; logged, never propagated.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Css(#[from] CssError),
}

/// A configured pipeline bound to a build context.
#[derive(Debug, Clone)]
pub struct StylePipeline<'a> {
    context: &'a BuildContext,
    name: String,
    config: PipelineConfig,
}

impl<'a> StylePipeline<'a> {
    /// Look up a pipeline by name in the context's configuration.
    pub fn new(context: &'a BuildContext, name: &str) -> Result<Self, PipelineError> {
        let config = context
            .config()
            .pipeline(name)
            .cloned()
            .ok_or_else(|| PipelineError::UnknownPipeline(name.to_string()))?;
        Ok(Self { context, name: name.to_string(), config })
    }

    /// All pipelines of the context, in configuration order.
    pub fn all(context: &'a BuildContext) -> Vec<Self> {
        context
            .config()
            .pipelines
            .iter()
            .map(|(name, config)| Self { context, name: name.clone(), config: config.clone() })
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn context(&self) -> &'a BuildContext {
        self.context
    }

    /// Absolute path of the entry point.
    pub fn entry_path(&self) -> PathBuf {
        self.context.entry_path(&self.config)
    }

    /// Absolute path of the compiled CSS.
    pub fn output_path(&self) -> PathBuf {
        self.context.output_path(&self.config)
    }

    /// Post-processing steps for the context's build mode.
    pub fn process_options(&self) -> ProcessOptions {
        let config = self.context.config();
        let finisher = match self.context.mode() {
            BuildMode::Production => Finisher::Minify {
                level: MinifyLevel::from_level(config.minify.level),
                targets: compatibility_targets(&config.minify.compatibility),
            },
            BuildMode::Development => Finisher::SourceMap {
                mode: config.source_map.mode,
                map_file_name: format!("{}.map", self.config.output_file_name()),
                project_root: self.context.project_root().to_string_lossy().into_owned(),
            },
        };
        ProcessOptions { sort_media_queries: self.config.sort_media_queries, finisher }
    }

    /// Run the pipeline once.
    pub fn run(&self) -> Result<PipelineResult, PipelineError> {
        let start = Instant::now();
        let entry = self.entry_path();
        info!(pipeline = %self.name, mode = %self.context.mode(), "Building {}", entry.display());

        let finished = match self.transform(&entry) {
            Ok(finished) => finished,
            Err(e) => {
                error!(pipeline = %self.name, file = %entry.display(), "{}", e);
                return Ok(PipelineResult::failed(self.name.clone(), e.to_string(), start.elapsed()));
            }
        };

        let outputs = self.write(finished)?;
        let duration = start.elapsed();

        for output in &outputs {
            if self.context.is_verbose() {
                info!(pipeline = %self.name, "Wrote {}", output.display());
            } else {
                debug!(pipeline = %self.name, "Wrote {}", output.display());
            }
        }
        info!(pipeline = %self.name, "Finished in {:?}", duration);

        Ok(PipelineResult::success(self.name.clone(), outputs, duration))
    }

    /// Compile and post-process the entry point without touching the disk.
    pub fn transform(&self, entry: &Path) -> Result<FinishedCss, StageError> {
        let compiler = ScssCompiler::new(self.context.load_paths())
            .with_quiet(self.context.config().compiler.quiet);

        let compiled = compiler.compile_file(entry)?;
        debug!(pipeline = %self.name, bytes = compiled.len(), "Compiled SCSS");

        // The map embeds compiled CSS, so its source is labelled as such
        let label = format!("{}.css", entry.display());
        let finished = css::process(&compiled, &label, &self.process_options())?;
        debug!(pipeline = %self.name, bytes = finished.code.len(), "Post-processed CSS");

        Ok(finished)
    }

    /// Write the finished stylesheet (and map), then touch the CSS file.
    fn write(&self, finished: FinishedCss) -> Result<Vec<PathBuf>, PipelineError> {
        let css_path = self.output_path();
        let mut outputs = Vec::new();

        if let Some(map) = finished.map {
            let path = map_path(&css_path);
            write_atomic(&path, map.as_bytes()).map_err(|source| PipelineError::Io {
                path: path.clone(),
                source,
            })?;
            outputs.push(path);
        }

        write_atomic(&css_path, finished.code.as_bytes())
            .and_then(|_| touch(&css_path))
            .map_err(|source| PipelineError::Io { path: css_path.clone(), source })?;
        outputs.insert(0, css_path);

        Ok(outputs)
    }
}
