//! CSS post-processing of compiled stylesheets
//!
//! Compiled CSS is parsed once with [`lightningcss`], optionally run through
//! the media-query sorter, then printed by a [`Finisher`].

pub mod finish;
pub mod media;

pub use finish::{compatibility_targets, finish, FinishedCss, Finisher, MinifyLevel};
pub use media::{compare_queries, merge_media_queries, sort_media_queries, MediaOrder};

use lightningcss::stylesheet::{ParserOptions, StyleSheet};
use thiserror::Error;

/// Error raised while parsing, transforming or printing CSS
#[derive(Debug, Error)]
pub enum CssError {
    #[error("CSS parse error: {0}")]
    Parse(String),
    #[error("CSS minify error: {0}")]
    Minify(String),
    #[error("CSS print error: {0}")]
    Print(String),
    #[error("Source map error: {0}")]
    SourceMap(String),
}

/// Post-processing steps applied to compiled CSS.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Merge and sort `@media` blocks mobile-first
    pub sort_media_queries: bool,
    pub finisher: Finisher,
}

/// Parse compiled CSS, apply the configured steps and print the result.
///
/// `filename` names the stylesheet in source maps.
pub fn process(css: &str, filename: &str, options: &ProcessOptions) -> Result<FinishedCss, CssError> {
    let parser_options = ParserOptions { filename: filename.to_string(), ..ParserOptions::default() };
    let mut sheet =
        StyleSheet::parse(css, parser_options).map_err(|e| CssError::Parse(e.to_string()))?;

    if options.sort_media_queries {
        sort_media_queries(&mut sheet.rules)?;
    }

    finish(sheet, css, &options.finisher)
}
