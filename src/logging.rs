//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. `--log-level` / `--verbose` CLI flags (if provided)
//! 2. `STYLEPIPE_LOG` environment variable (any env-filter directive)
//! 3. default to `info`
//!
//! Logs go to STDERR so that stdout stays free for command output.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an env-filter directive
pub const LOG_ENV_VAR: &str = "STYLEPIPE_LOG";

/// Log level selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Build the filter from CLI level, environment, or the `info` default.
pub fn build_filter(cli_level: Option<LogLevel>, env_directive: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(level.as_directive());
    }
    env_directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Initialise the global logging subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(cli_level: Option<LogLevel>) {
    let env_directive = std::env::var(LOG_ENV_VAR).ok();
    let filter = build_filter(cli_level, env_directive.as_deref());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
