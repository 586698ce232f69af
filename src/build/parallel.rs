//! Parallel build execution.
//!
//! Pipelines share no state, so every selected pipeline runs on its own
//! rayon worker. Results are reported in configuration order.
//!
//! # Example
//!
//! ```ignore
//! use stylepipe::build::{BuildContext, ParallelBuild};
//!
//! let context = BuildContext::new(config, project_root, BuildMode::current());
//! let result = ParallelBuild::new(&context)
//!     .with_jobs(2)
//!     .run(&[])?;
//!
//! println!("{}", result.summary());
//! ```

use crate::build::{BuildContext, BuildResult, PipelineError, PipelineResult, StylePipeline};
use rayon::prelude::*;
use std::time::Instant;

/// Default number of parallel jobs (uses available parallelism).
fn default_jobs() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Parallel build executor.
pub struct ParallelBuild<'a> {
    /// Build context
    context: &'a BuildContext,
    /// Number of parallel jobs
    jobs: usize,
}

impl<'a> ParallelBuild<'a> {
    /// Create a new parallel build.
    pub fn new(context: &'a BuildContext) -> Self {
        Self { context, jobs: default_jobs() }
    }

    /// Set the number of parallel jobs.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Resolve pipeline names; an empty list selects every pipeline.
    pub fn select(&self, names: &[String]) -> Result<Vec<StylePipeline<'a>>, PipelineError> {
        if names.is_empty() {
            return Ok(StylePipeline::all(self.context));
        }
        names.iter().map(|name| StylePipeline::new(self.context, name)).collect()
    }

    /// Run the selected pipelines once.
    pub fn run(&self, names: &[String]) -> Result<BuildResult, PipelineError> {
        let start = Instant::now();
        let pipelines = self.select(names)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.min(pipelines.len().max(1)))
            .build()
            .map_err(|e| PipelineError::ThreadPool(e.to_string()))?;

        let results: Vec<Result<PipelineResult, PipelineError>> =
            pool.install(|| pipelines.par_iter().map(|pipeline| pipeline.run()).collect());

        let mut result = BuildResult::new();
        for pipeline_result in results {
            result.add_result(pipeline_result?);
        }

        Ok(result.with_duration(start.elapsed()))
    }
}

/// Run the named pipelines (all when empty) with default parallelism.
pub fn build_pipelines(context: &BuildContext, names: &[String]) -> Result<BuildResult, PipelineError> {
    ParallelBuild::new(context).run(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::BuildMode;
    use crate::config::{PipelineConfig, StylepipeConfig};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn context(temp: &TempDir) -> BuildContext {
        let mut config = StylepipeConfig::default();
        config.project.out = PathBuf::from("css");
        config.pipelines.insert("main".to_string(), PipelineConfig::new("scss/main.scss"));
        config.pipelines.insert("admin".to_string(), PipelineConfig::new("scss/admin.scss"));
        BuildContext::new(config, temp.path().to_path_buf(), BuildMode::Production)
    }

    #[test]
    fn test_zero_jobs_still_builds() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("scss")).unwrap();
        fs::write(temp.path().join("scss/main.scss"), ".main { color: red; }").unwrap();
        fs::write(temp.path().join("scss/admin.scss"), ".admin { color: blue; }").unwrap();
        let ctx = context(&temp);

        let result = ParallelBuild::new(&ctx).with_jobs(0).run(&[]).unwrap();
        assert_eq!(result.success_count(), 2);
    }

    #[test]
    fn test_select() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        let build = ParallelBuild::new(&ctx);

        let all: Vec<_> = build.select(&[]).unwrap().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(all, vec!["admin", "main"]);

        let one = build.select(&["main".to_string()]).unwrap();
        assert_eq!(one.len(), 1);

        assert!(matches!(
            build.select(&["nope".to_string()]),
            Err(PipelineError::UnknownPipeline(_))
        ));
    }

    #[test]
    fn test_run_builds_each_pipeline() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("scss")).unwrap();
        fs::write(temp.path().join("scss/main.scss"), ".main { color: red; }").unwrap();
        fs::write(temp.path().join("scss/admin.scss"), ".admin { color: blue; }").unwrap();
        let ctx = context(&temp);

        let result = ParallelBuild::new(&ctx).with_jobs(2).run(&[]).unwrap();

        assert!(result.is_success());
        assert_eq!(result.pipelines.len(), 2);
        assert_eq!(result.pipelines[0].pipeline, "admin");
        assert!(temp.path().join("css/main.css").exists());
        assert!(temp.path().join("css/admin.css").exists());
    }

    #[test]
    fn test_run_isolates_failures() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("scss")).unwrap();
        fs::write(temp.path().join("scss/main.scss"), ".main { color: red; }").unwrap();
        fs::write(temp.path().join("scss/admin.scss"), ".admin { color: $undefined; }").unwrap();
        let ctx = context(&temp);

        let result = ParallelBuild::new(&ctx).run(&[]).unwrap();

        assert_eq!(result.success_count(), 1);
        assert_eq!(result.failed_count(), 1);
        assert_eq!(result.failures()[0].pipeline, "admin");
        assert!(temp.path().join("css/main.css").exists());
        assert!(!temp.path().join("css/admin.css").exists());
    }
}
