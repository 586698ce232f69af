//! Build pipeline module for stylepipe
//!
//! Provides the build system that turns SCSS entry points into CSS files.
//!
//! # Overview
//!
//! Each configured pipeline is a fixed chain of steps:
//! - **Compile**: SCSS to CSS with the configured load paths
//! - **Post-process**: optional media-query merge and mobile-first sort
//! - **Finish**: minify (production) or attach a source map (development)
//! - **Write**: atomic write to the output directory, then touch
//!
//! # Example
//!
//! ```ignore
//! use stylepipe::build::{BuildContext, BuildMode, ParallelBuild};
//! use stylepipe::config::load_config;
//!
//! let config = load_config(None)?;
//! let context = BuildContext::new(config, project_root, BuildMode::current());
//!
//! let result = ParallelBuild::new(&context).run(&[])?;
//! println!("{}", result.summary());
//! ```

pub mod context;
pub mod mode;
pub mod parallel;
pub mod pipeline;
pub mod result;

pub use context::*;
pub use mode::*;
pub use parallel::*;
pub use pipeline::*;
pub use result::*;
