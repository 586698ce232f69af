//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod build;
mod list;

use clap::{Parser, Subcommand};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

use crate::build::{BuildContext, BuildMode};
use crate::config::loader::{find_config, load_config, merge_cli_overrides, CliOverrides};
use crate::config::{default_config, ConfigError};
use crate::logging::{init_logging, LogLevel};

/// Process exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// stylepipe - Compile SCSS entry points into CSS
#[derive(Parser)]
#[command(name = "stylepipe")]
#[command(about = "stylepipe - Compile SCSS entry points into minified or source-mapped CSS")]
#[command(version)]
pub struct Cli {
    /// Path to stylepipe.toml (default: search upwards from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the output directory
    #[arg(long, global = true)]
    pub out: Option<PathBuf>,

    /// Verbose output (debug logging, list written files)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (overrides STYLEPIPE_LOG and --verbose)
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run pipelines once
    Build {
        /// Pipelines to build (default: all)
        pipelines: Vec<String>,

        /// Number of pipelines built in parallel (default: available cores)
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Run pipelines once, then again whenever their sources change
    Watch {
        /// Pipelines to watch (default: all)
        pipelines: Vec<String>,
    },
    /// List configured pipelines with their resolved paths
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Resolve configuration and project root into a build context.
///
/// The project root is the directory holding the config file, or the
/// current directory when the built-in default configuration is used.
pub fn load_context(
    config_path: Option<&Path>,
    out: Option<&Path>,
    verbose: bool,
) -> Result<BuildContext, ConfigError> {
    let cwd = env::current_dir()?;

    let (mut config, project_root) = match config_path.map(Path::to_path_buf).or_else(find_config) {
        Some(path) => {
            debug!("Using config: {}", path.display());
            let config = load_config(Some(&path))?;
            let parent = path.parent().unwrap_or_else(|| Path::new(""));
            (config, cwd.join(parent))
        }
        None => {
            debug!("No stylepipe.toml found, using defaults");
            (default_config(), cwd)
        }
    };

    let overrides = CliOverrides { out: out.map(Path::to_path_buf) };
    merge_cli_overrides(&mut config, &overrides);

    Ok(BuildContext::new(config, project_root, BuildMode::current()).with_verbose(verbose))
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let level = cli.log_level.or(if cli.verbose { Some(LogLevel::Debug) } else { None });
    init_logging(level);

    let context = match load_context(cli.config.as_deref(), cli.out.as_deref(), cli.verbose) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match cli.command {
        Commands::Build { pipelines, jobs } => build::run_build(&context, &pipelines, jobs),
        Commands::Watch { pipelines } => build::run_watch(&context, &pipelines),
        Commands::List { json } => list::run_list(&context, json),
    }
}
