//! SCSS compilation.
//!
//! This module uses [`grass`] under the hood.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// SCSS compilation error.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Entry point missing on disk
    #[error("Entry point not found: {}", .0.display())]
    EntryNotFound(PathBuf),
    /// Grass error
    #[error(transparent)]
    Grass(#[from] Box<grass::Error>),
}

/// SCSS compiler configured with a load path list.
pub struct ScssCompiler {
    load_paths: Vec<PathBuf>,
    quiet: bool,
}

impl ScssCompiler {
    /// Create a compiler that resolves imports against `load_paths`.
    pub fn new(load_paths: Vec<PathBuf>) -> Self {
        Self { load_paths, quiet: false }
    }

    /// Suppress `@warn` and `@debug` output.
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn options(&self) -> grass::Options<'_> {
        self.load_paths
            .iter()
            .fold(grass::Options::default(), |options, path| options.load_path(path))
            .style(grass::OutputStyle::Expanded)
            .quiet(self.quiet)
    }

    /// Compile a stylesheet file to CSS.
    ///
    /// Imports relative to the file are resolved first, then the load paths.
    pub fn compile_file(&self, entry: &Path) -> Result<String, CompileError> {
        if !entry.is_file() {
            return Err(CompileError::EntryNotFound(entry.to_path_buf()));
        }
        Ok(grass::from_path(entry, &self.options())?)
    }
}

impl Default for ScssCompiler {
    fn default() -> Self {
        Self::new(vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn entry(temp: &TempDir, content: &str) -> PathBuf {
        let path = temp.path().join("main.scss");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_compile_nested_rules() {
        let temp = TempDir::new().unwrap();
        let css = ScssCompiler::default()
            .compile_file(&entry(&temp, ".a { .b { color: #000; } }"))
            .unwrap();
        assert!(css.contains(".a .b"));
    }

    #[test]
    fn test_compile_error_unmatched_brace() {
        let temp = TempDir::new().unwrap();
        let result = ScssCompiler::default().compile_file(&entry(&temp, ".a { color: red;"));
        assert!(matches!(result, Err(CompileError::Grass(_))));
    }

    #[test]
    fn test_compile_file_resolves_load_path() {
        let temp = TempDir::new().unwrap();
        let vendor = temp.path().join("node_modules/theme");
        fs::create_dir_all(&vendor).unwrap();
        fs::write(vendor.join("_colors.scss"), "$brand: #206b82;").unwrap();

        let entry = temp.path().join("main.scss");
        fs::write(&entry, "@import \"theme/colors\";\n.header { color: $brand; }").unwrap();

        let compiler = ScssCompiler::new(vec![temp.path().join("node_modules")]);
        let css = compiler.compile_file(&entry).unwrap();
        assert!(css.contains(".header"));
        assert!(css.contains("#206b82"));
    }

    #[test]
    fn test_compile_file_missing_entry() {
        let compiler = ScssCompiler::default();
        let result = compiler.compile_file(Path::new("/nonexistent/main.scss"));
        assert!(matches!(result, Err(CompileError::EntryNotFound(_))));
    }
}
