//! Build command implementations (build, watch)

use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::build::{build_pipelines, BuildContext, ParallelBuild, PipelineError};
use crate::watch::{watch_pipelines, WatchError};

/// Report an unknown pipeline name together with the available ones.
fn unknown_pipeline(context: &BuildContext, name: &str) -> ExitCode {
    eprintln!("Error: Unknown pipeline '{}'", name);
    let available: Vec<&str> = context.config().pipelines.keys().map(String::as_str).collect();
    eprintln!("Available pipelines: {}", available.join(", "));
    ExitCode::from(EXIT_INVALID_ARGS)
}

/// Run the build command
///
/// Compile failures are reported in the summary but do not fail the process.
pub fn run_build(context: &BuildContext, pipelines: &[String], jobs: Option<usize>) -> ExitCode {
    let result = match jobs {
        Some(jobs) => ParallelBuild::new(context).with_jobs(jobs).run(pipelines),
        None => build_pipelines(context, pipelines),
    };

    match result {
        Ok(result) => {
            if result.is_success() {
                println!("{}", result.summary());
            } else {
                eprintln!("{}", result.summary());
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(PipelineError::UnknownPipeline(name)) => unknown_pipeline(context, &name),
        Err(e) => {
            eprintln!("Build error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Run the watch command until the process is interrupted
pub fn run_watch(context: &BuildContext, pipelines: &[String]) -> ExitCode {
    println!("Starting watch mode ({})...", context.mode());
    println!("Press Ctrl+C to stop");
    println!();

    let shutdown = AtomicBool::new(false);
    match watch_pipelines(context, pipelines, &shutdown) {
        Ok(_) => ExitCode::from(EXIT_SUCCESS),
        Err(WatchError::Pipeline(PipelineError::UnknownPipeline(name))) => {
            unknown_pipeline(context, &name)
        }
        Err(e) => {
            eprintln!("Watch error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
