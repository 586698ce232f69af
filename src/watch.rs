//! Watch mode for automatic rebuilds on file changes
//!
//! Each pipeline gets its own [`WatchController`]: it builds once at start,
//! then once per debounced batch of changes matching the pipeline's watch
//! glob. Build failures never stop the watcher.

use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::build::{BuildContext, ParallelBuild, PipelineError, PipelineResult, StylePipeline};
use crate::config::WatchConfig;

/// How often the watch loop checks the shutdown flag
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

/// Error during watch mode
#[derive(Debug, Error)]
pub enum WatchError {
    /// Failed to initialize file watcher
    #[error("Failed to initialize file watcher: {0}")]
    WatcherInit(notify::Error),
    /// Failed to add watch path
    #[error("Failed to watch path: {0}")]
    WatchPath(notify::Error),
    /// Channel receive error
    #[error("Watch channel error: {0}")]
    ChannelError(String),
    /// Watch glob could not be compiled
    #[error("Invalid watch pattern '{0}': {1}")]
    InvalidPattern(String, glob::PatternError),
    /// Source directory not found
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    /// Pipeline selection failed
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Tracks failing pipelines across rebuilds for recovery detection
#[derive(Debug, Default)]
pub struct ErrorTracker {
    /// Pipelines that failed in the previous build
    failing: HashSet<String>,
}

impl ErrorTracker {
    /// Create a new error tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Update tracker with new results, returns pipelines that recovered
    pub fn update<'r>(&mut self, results: impl IntoIterator<Item = &'r PipelineResult>) -> Vec<String> {
        let current: HashSet<String> = results
            .into_iter()
            .filter(|r| r.status.is_failure())
            .map(|r| r.pipeline.clone())
            .collect();

        let mut fixed: Vec<String> = self.failing.difference(&current).cloned().collect();
        fixed.sort();

        self.failing = current;
        fixed
    }
}

/// Counters reported when a watcher stops
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WatchSummary {
    /// Pipeline runs, including the initial one
    pub builds: usize,
    /// Runs that did not produce output
    pub failures: usize,
}

/// Split a glob into its literal directory prefix and the pattern below it.
///
/// `assets/scss/**/*.scss` -> (`assets/scss`, `**/*.scss`). A pattern without
/// wildcards is treated as a single file inside its parent directory.
pub fn split_glob(pattern: &str) -> (PathBuf, String) {
    let segments: Vec<&str> = pattern.split('/').collect();
    let first_glob = segments
        .iter()
        .position(|s| s.contains(|c| matches!(c, '*' | '?' | '[' | '{')))
        .unwrap_or(segments.len() - 1);

    let root = segments[..first_glob].join("/");
    let rest = segments[first_glob..].join("/");

    let root = if root.is_empty() {
        if pattern.starts_with('/') {
            PathBuf::from("/")
        } else {
            PathBuf::from(".")
        }
    } else {
        PathBuf::from(root)
    };
    (root, rest)
}

/// Rebuilds one pipeline whenever files under its watch glob change.
#[derive(Debug)]
pub struct WatchController<'a> {
    pipeline: StylePipeline<'a>,
    root: PathBuf,
    pattern: glob::Pattern,
    config: WatchConfig,
}

impl<'a> WatchController<'a> {
    /// Create a controller for a pipeline, resolving its watch glob.
    pub fn new(pipeline: StylePipeline<'a>) -> Result<Self, WatchError> {
        let context = pipeline.context();
        let raw = pipeline.config().watch_glob();
        // Only the configured glob is split; the project root is a literal path
        let (relative_root, rest) = split_glob(&raw);
        let root = context.resolve_path(&relative_root);

        if !root.is_dir() {
            return Err(WatchError::SourceNotFound(root));
        }
        // Canonical root so event paths (which notify reports resolved) match
        let root = root.canonicalize().unwrap_or(root);

        let full = format!("{}/{}", glob::Pattern::escape(&root.to_string_lossy()), rest);
        let pattern = glob::Pattern::new(&full).map_err(|e| WatchError::InvalidPattern(raw, e))?;

        Ok(Self { config: context.config().watch.clone(), pipeline, root, pattern })
    }

    /// Directory handed to the file watcher.
    pub fn watch_root(&self) -> &Path {
        &self.root
    }

    /// Check if a changed path should trigger a rebuild
    pub fn is_relevant(&self, path: &Path) -> bool {
        self.pattern.matches_path(path)
    }

    /// Run the pipeline once and report the outcome.
    pub fn rebuild(&self, tracker: &mut ErrorTracker, summary: &mut WatchSummary) {
        let name = self.pipeline.name();
        let start = Instant::now();
        summary.builds += 1;

        match self.pipeline.run() {
            Ok(result) => {
                for fixed in tracker.update(std::iter::once(&result)) {
                    info!(pipeline = %fixed, "Fixed");
                }
                if result.is_success() {
                    info!(pipeline = %name, "Build complete ({})", format_duration(start.elapsed()));
                } else {
                    summary.failures += 1;
                    warn!(pipeline = %name, "Build failed ({})", format_duration(start.elapsed()));
                }
            }
            Err(e) => {
                summary.failures += 1;
                error!(pipeline = %name, "{}", e);
            }
        }
    }

    /// Build once, then rebuild on every relevant change until `shutdown` is set.
    pub fn run(&self, shutdown: &AtomicBool) -> Result<WatchSummary, WatchError> {
        let (tx, rx) = channel();

        let debounce_duration = Duration::from_millis(u64::from(self.config.debounce_ms));
        let mut debouncer = new_debouncer(debounce_duration, tx).map_err(WatchError::WatcherInit)?;

        debouncer
            .watcher()
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(WatchError::WatchPath)?;

        let mut tracker = ErrorTracker::new();
        let mut summary = WatchSummary::default();

        if self.config.clear_screen {
            clear_screen();
        }
        self.rebuild(&mut tracker, &mut summary);
        info!(pipeline = %self.pipeline.name(), "Watching {} for changes...", self.root.display());

        while !shutdown.load(Ordering::SeqCst) {
            match rx.recv_timeout(SHUTDOWN_POLL) {
                Ok(Ok(events)) => {
                    let relevant: Vec<_> = events
                        .iter()
                        .filter(|e| {
                            matches!(e.kind, DebouncedEventKind::Any) && self.is_relevant(&e.path)
                        })
                        .collect();

                    if relevant.is_empty() {
                        continue;
                    }

                    for event in &relevant {
                        if let Some(name) = event.path.file_name() {
                            info!(pipeline = %self.pipeline.name(), "Changed: {}", name.to_string_lossy());
                        }
                    }

                    if self.config.clear_screen {
                        clear_screen();
                    }
                    self.rebuild(&mut tracker, &mut summary);
                    info!(pipeline = %self.pipeline.name(), "Watching {} for changes...", self.root.display());
                }
                Ok(Err(error)) => {
                    warn!("Watch error: {:?}", error);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(WatchError::ChannelError("watcher disconnected".to_string()));
                }
            }
        }

        Ok(summary)
    }
}

/// Watch the selected pipelines (all when `names` is empty), one thread each.
///
/// Blocks until `shutdown` is set; the CLI never sets it and runs until the
/// process is interrupted.
pub fn watch_pipelines(
    context: &BuildContext,
    names: &[String],
    shutdown: &AtomicBool,
) -> Result<Vec<WatchSummary>, WatchError> {
    let controllers = ParallelBuild::new(context)
        .select(names)?
        .into_iter()
        .map(WatchController::new)
        .collect::<Result<Vec<_>, _>>()?;

    std::thread::scope(|scope| {
        let handles: Vec<_> =
            controllers.iter().map(|controller| scope.spawn(move || controller.run(shutdown))).collect();

        handles
            .into_iter()
            .map(|handle| {
                handle.join().unwrap_or_else(|_| {
                    Err(WatchError::ChannelError("watch thread panicked".to_string()))
                })
            })
            .collect()
    })
}

/// Clear the terminal screen
fn clear_screen() {
    // ANSI escape code to clear screen and move cursor to top-left
    print!("\x1B[2J\x1B[1;1H");
}

/// Format duration for display
fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}
