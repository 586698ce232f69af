//! Build result types.
//!
//! Contains types for representing the outcome of pipeline runs.

use std::path::PathBuf;
use std::time::Duration;

/// Status of a single pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    /// Output written
    Success,
    /// Compilation failed; previous output left untouched
    Failed(String),
}

impl BuildStatus {
    /// Check if the status indicates success.
    pub fn is_success(&self) -> bool {
        matches!(self, BuildStatus::Success)
    }

    /// Check if the status indicates failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, BuildStatus::Failed(_))
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildStatus::Success => write!(f, "success"),
            BuildStatus::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Result of running a single pipeline.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Pipeline name
    pub pipeline: String,
    /// Build status
    pub status: BuildStatus,
    /// Output files produced
    pub outputs: Vec<PathBuf>,
    /// Build duration
    pub duration: Duration,
}

impl PipelineResult {
    /// Create a successful result.
    pub fn success(pipeline: String, outputs: Vec<PathBuf>, duration: Duration) -> Self {
        Self { pipeline, status: BuildStatus::Success, outputs, duration }
    }

    /// Create a failed result.
    pub fn failed(pipeline: String, error: String, duration: Duration) -> Self {
        Self { pipeline, status: BuildStatus::Failed(error), outputs: vec![], duration }
    }

    /// Check if this result is successful.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Result of a complete build run.
#[derive(Debug, Default)]
pub struct BuildResult {
    /// Results for each pipeline
    pub pipelines: Vec<PipelineResult>,
    /// Total build duration
    pub total_duration: Duration,
}

impl BuildResult {
    /// Create a new empty build result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pipeline result.
    pub fn add_result(&mut self, result: PipelineResult) {
        self.pipelines.push(result);
    }

    /// Set the total duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.total_duration = duration;
        self
    }

    /// Get the number of successful pipelines.
    pub fn success_count(&self) -> usize {
        self.pipelines.iter().filter(|r| r.status.is_success()).count()
    }

    /// Get the number of failed pipelines.
    pub fn failed_count(&self) -> usize {
        self.pipelines.iter().filter(|r| r.status.is_failure()).count()
    }

    /// Check if the overall build succeeded (no failures).
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// Get failed pipeline results.
    pub fn failures(&self) -> Vec<&PipelineResult> {
        self.pipelines.iter().filter(|r| r.status.is_failure()).collect()
    }

    /// Format a summary of the build result.
    pub fn summary(&self) -> String {
        let success = self.success_count();
        let failed = self.failed_count();
        let total = self.pipelines.len();

        if failed > 0 {
            let mut lines = vec![format!(
                "Build failed: {} succeeded, {} failed ({} total)",
                success, failed, total
            )];
            for pipeline in self.failures() {
                lines.push(format!("  - {}: {}", pipeline.pipeline, pipeline.status));
            }
            lines.join("\n")
        } else {
            format!("Build succeeded: {} built ({} total) in {:?}", success, total, self.total_duration)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_status() {
        assert!(BuildStatus::Success.is_success());
        assert!(!BuildStatus::Success.is_failure());

        let failed = BuildStatus::Failed("expected \"}\"".to_string());
        assert!(failed.is_failure());
        assert_eq!(failed.to_string(), "failed: expected \"}\"");
    }

    #[test]
    fn test_pipeline_result_constructors() {
        let ok = PipelineResult::success(
            "main".to_string(),
            vec![PathBuf::from("out/main.css")],
            Duration::from_millis(5),
        );
        assert!(ok.is_success());
        assert_eq!(ok.outputs.len(), 1);

        let failed =
            PipelineResult::failed("main".to_string(), "boom".to_string(), Duration::ZERO);
        assert!(!failed.is_success());
        assert!(failed.outputs.is_empty());
    }

    #[test]
    fn test_build_result_counts() {
        let mut result = BuildResult::new();
        result.add_result(PipelineResult::success(
            "main".to_string(),
            vec![PathBuf::from("a.css"), PathBuf::from("a.css.map")],
            Duration::ZERO,
        ));
        result.add_result(PipelineResult::failed(
            "admin".to_string(),
            "bad".to_string(),
            Duration::ZERO,
        ));

        assert_eq!(result.success_count(), 1);
        assert_eq!(result.failed_count(), 1);
        assert!(!result.is_success());
        assert_eq!(result.failures()[0].pipeline, "admin");
    }

    #[test]
    fn test_summary() {
        let mut result = BuildResult::new();
        result.add_result(PipelineResult::success("main".to_string(), vec![], Duration::ZERO));
        assert!(result.summary().starts_with("Build succeeded: 1 built (1 total)"));

        result.add_result(PipelineResult::failed(
            "admin".to_string(),
            "Undefined variable.".to_string(),
            Duration::ZERO,
        ));
        let summary = result.summary();
        assert!(summary.starts_with("Build failed: 1 succeeded, 1 failed (2 total)"));
        assert!(summary.contains("  - admin: failed: Undefined variable."));
    }
}
