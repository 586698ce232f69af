//! Stylesheet output: atomic writes and modification-time touch

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Write `contents` to `path` through a uniquely named sibling temp file
/// and a rename.
///
/// Readers never observe a half-written file, and concurrent writers to the
/// same path each rename a complete file of their own. Parent directories
/// are created as needed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    // Dropped (and removed) on any error before the rename
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Set a file's modification time to now.
pub fn touch(path: &Path) -> io::Result<()> {
    let file = File::options().write(true).open(path)?;
    file.set_modified(SystemTime::now())
}

/// Source map path for a stylesheet (`main.css` -> `main.css.map`).
pub fn map_path(css_path: &Path) -> PathBuf {
    let mut name = css_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".map");
    css_path.with_file_name(name)
}
