//! stylepipe - SCSS build and watch pipelines
//!
//! This library provides functionality to:
//! - Compile SCSS entry points with `grass`
//! - Merge and sort media queries mobile-first
//! - Minify (production) or attach source maps (development) with `lightningcss`
//! - Rebuild pipelines on file changes

pub mod build;
pub mod cli;
pub mod compile;
pub mod config;
pub mod css;
pub mod logging;
pub mod output;
pub mod watch;
