//! stylepipe - Command-line tool for compiling SCSS pipelines

use std::process::ExitCode;

use stylepipe::cli;

fn main() -> ExitCode {
    cli::run()
}
