//! List command: show configured pipelines and where they write

use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::build::{BuildContext, BuildMode};

/// One pipeline with its paths resolved against the project root
#[derive(Debug, Serialize)]
pub struct PipelineListing {
    pub name: String,
    pub entry: PathBuf,
    pub output: PathBuf,
    pub watch: String,
    pub sort_media_queries: bool,
}

/// Everything `list` reports
#[derive(Debug, Serialize)]
pub struct ProjectListing {
    pub project: String,
    pub root: PathBuf,
    pub mode: BuildMode,
    pub pipelines: Vec<PipelineListing>,
}

impl ProjectListing {
    pub fn from_context(context: &BuildContext) -> Self {
        let pipelines = context
            .config()
            .pipelines
            .iter()
            .map(|(name, pipeline)| PipelineListing {
                name: name.clone(),
                entry: context.entry_path(pipeline),
                output: context.output_path(pipeline),
                watch: context.watch_pattern(pipeline),
                sort_media_queries: pipeline.sort_media_queries,
            })
            .collect();

        Self {
            project: context.config().project.name.clone(),
            root: context.project_root().to_path_buf(),
            mode: context.mode(),
            pipelines,
        }
    }
}

/// Run the list command
pub fn run_list(context: &BuildContext, json: bool) -> ExitCode {
    let listing = ProjectListing::from_context(context);

    if json {
        return match serde_json::to_string_pretty(&listing) {
            Ok(out) => {
                println!("{}", out);
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        };
    }

    println!("Project: {} ({})", listing.project, listing.root.display());
    println!("Mode: {}", listing.mode);
    for pipeline in &listing.pipelines {
        println!("  {}", pipeline.name);
        println!("    entry:  {}", pipeline.entry.display());
        println!("    output: {}", pipeline.output.display());
        println!("    watch:  {}", pipeline.watch);
        if pipeline.sort_media_queries {
            println!("    sort media queries");
        }
    }
    ExitCode::from(EXIT_SUCCESS)
}
