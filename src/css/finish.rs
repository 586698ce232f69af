//! Final CSS printing: minification for production, source maps for development.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use lightningcss::stylesheet::{MinifyOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use parcel_sourcemap::SourceMap;

use super::{media, CssError};
use crate::config::SourceMapMode;

/// Minification aggressiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinifyLevel {
    /// Strip whitespace and comments only
    Whitespace,
    /// Optimize declarations and merge adjacent rules
    Basic,
    /// Basic plus merging of duplicate `@media` blocks
    Advanced,
}

impl MinifyLevel {
    /// Map a numeric level (0, 1, 2) to a minify level, clamping above 2.
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => MinifyLevel::Whitespace,
            1 => MinifyLevel::Basic,
            _ => MinifyLevel::Advanced,
        }
    }
}

/// How the finished stylesheet is printed.
#[derive(Debug, Clone)]
pub enum Finisher {
    /// Minify for production
    Minify { level: MinifyLevel, targets: Targets },
    /// Pretty-print with a source map
    SourceMap { mode: SourceMapMode, map_file_name: String, project_root: String },
}

/// CSS text plus the companion source map, if one is written separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedCss {
    pub code: String,
    pub map: Option<String>,
}

/// Browser targets for a compatibility preset.
///
/// `*` follows the IE10+ compatibility mode of classic CSS minifiers.
/// Unknown presets and `none` apply no targets.
pub fn compatibility_targets(preset: &str) -> Targets {
    let ie = match preset {
        "*" | "ie10" => 10,
        "ie11" => 11,
        "ie9" => 9,
        "ie8" => 8,
        "ie7" => 7,
        _ => return Targets::default(),
    };
    Targets::from(Browsers { ie: Some(ie << 16), ..Browsers::default() })
}

/// Charset rule restored at the top of non-ASCII output, since lightningcss
/// drops `@charset` while parsing.
const CHARSET_RULE: &str = "@charset \"UTF-8\";";

/// Print a parsed stylesheet according to the finisher.
///
/// `source` is the text the stylesheet was parsed from; it is embedded as
/// the map's source content. The map's source is named after the parser
/// filename, so callers name it after the compiled CSS it holds.
pub fn finish(
    mut sheet: StyleSheet<'_>,
    source: &str,
    finisher: &Finisher,
) -> Result<FinishedCss, CssError> {
    match finisher {
        Finisher::Minify { level, targets } => {
            if *level == MinifyLevel::Advanced {
                media::merge_media_queries(&mut sheet.rules)?;
            }
            if *level != MinifyLevel::Whitespace {
                sheet
                    .minify(MinifyOptions { targets: *targets, ..MinifyOptions::default() })
                    .map_err(|e| CssError::Minify(e.to_string()))?;
            }
            let printed = sheet
                .to_css(PrinterOptions { minify: true, targets: *targets, ..PrinterOptions::default() })
                .map_err(|e| CssError::Print(e.to_string()))?;
            let code = if printed.code.is_ascii() {
                printed.code
            } else {
                format!("{}{}", CHARSET_RULE, printed.code)
            };
            Ok(FinishedCss { code, map: None })
        }
        Finisher::SourceMap { mode, map_file_name, project_root } => {
            let mut source_map = SourceMap::new(project_root);
            let filename = sheet.sources.first().cloned().unwrap_or_default();
            source_map.add_source(&filename);
            source_map
                .set_source_content(0, source)
                .map_err(|e| CssError::SourceMap(e.to_string()))?;

            let printed = sheet
                .to_css(PrinterOptions {
                    source_map: Some(&mut source_map),
                    ..PrinterOptions::default()
                })
                .map_err(|e| CssError::Print(e.to_string()))?;

            let mut code = printed.code;
            if !code.is_ascii() {
                code.insert(0, '\n');
                code.insert_str(0, CHARSET_RULE);
                source_map.offset_lines(0, 1).map_err(|e| CssError::SourceMap(e.to_string()))?;
            }

            let map_json =
                source_map.to_json(None).map_err(|e| CssError::SourceMap(e.to_string()))?;

            if !code.ends_with('\n') {
                code.push('\n');
            }
            match mode {
                SourceMapMode::File => {
                    code.push_str(&format!("/*# sourceMappingURL={} */\n", map_file_name));
                    Ok(FinishedCss { code, map: Some(map_json) })
                }
                SourceMapMode::Inline => {
                    code.push_str(&format!(
                        "/*# sourceMappingURL=data:application/json;charset=utf-8;base64,{} */\n",
                        STANDARD.encode(map_json)
                    ));
                    Ok(FinishedCss { code, map: None })
                }
            }
        }
    }
}
