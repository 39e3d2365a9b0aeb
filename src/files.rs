//! File system helpers shared by the skeleton copier and the executor.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Writes `content`, creating parent directories as needed.
pub fn write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    write_bytes(path, content.as_bytes())
}

pub fn write_bytes<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(Error::IoError)?;
    }
    fs::write(path, content).map_err(Error::IoError)
}

pub fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(source: P, dest: Q) -> Result<()> {
    let dest = dest.as_ref();
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(Error::IoError)?;
    }
    fs::copy(source, dest).map(|_| ()).map_err(Error::IoError)
}

/// Lists the files under `dir` as paths relative to it, sorted by name.
/// With `recursive == false` only the immediate files are returned.
pub fn list_files<P: AsRef<Path>>(dir: P, recursive: bool) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut walker = WalkDir::new(dir).min_depth(1).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| Error::IoError(e.into()))?;
        if entry.file_type().is_file() {
            let relative = entry
                .path()
                .strip_prefix(dir)
                .map_err(|e| Error::ConfigError(e.to_string()))?;
            files.push(relative.to_path_buf());
        }
    }
    Ok(files)
}

/// Relative path rendered with forward slashes, for logs and reports.
pub fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
