//! Base skeleton materialization.
//! Copies a framework's skeleton into the output directory before any module
//! operation runs, honoring ignore patterns in the manner of `.gitignore`.

use crate::constants::{
    DEFAULT_IGNORE_PATTERNS, DOTFILE_FALLBACKS, ENV_EXAMPLE_FILE, ENV_FILE, IGNORE_FILE,
    SKELETONS_DIR,
};
use crate::error::{Error, Result};
use crate::files::{copy_file, display_relative, list_files};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

/// Ensures the output directory is safe to write to.
///
/// # Errors
/// * `Error::OutputDirectoryExistsError` if the directory exists and `force` is false
pub fn ensure_output_dir<P: AsRef<Path>>(output_dir: P, force: bool) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    if output_dir.exists() && !force {
        return Err(Error::OutputDirectoryExistsError {
            output_dir: output_dir.display().to_string(),
        });
    }
    Ok(output_dir.to_path_buf())
}

pub fn skeleton_dir<P: AsRef<Path>>(stack_root: P, framework: &str) -> PathBuf {
    stack_root.as_ref().join(SKELETONS_DIR).join(framework)
}

/// Builds the ignore set from the defaults plus the skeleton's ignore file.
/// Blank lines and `#` comments in the ignore file are skipped.
///
/// # Errors
/// * `Error::IgnoreError` for an invalid glob
pub fn parse_ignore_file<P: AsRef<Path>>(skeleton_dir: P) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in DEFAULT_IGNORE_PATTERNS {
        builder.add(Glob::new(pattern).map_err(|e| Error::IgnoreError(e.to_string()))?);
    }

    let ignore_path = skeleton_dir.as_ref().join(IGNORE_FILE);
    if let Ok(contents) = read_to_string(&ignore_path) {
        for line in contents.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            builder.add(Glob::new(line).map_err(|e| {
                Error::IgnoreError(format!("{} loading failed: {}", IGNORE_FILE, e))
            })?);
        }
    } else {
        debug!("{} does not exist", ignore_path.display());
    }

    builder.build().map_err(|e| Error::IgnoreError(e.to_string()))
}

/// `_gitignore` → `.gitignore` for the names in [`DOTFILE_FALLBACKS`].
pub fn dotfile_name(file_name: &str) -> Option<String> {
    file_name
        .strip_prefix('_')
        .filter(|rest| DOTFILE_FALLBACKS.contains(rest))
        .map(|rest| format!(".{}", rest))
}

/// Copies the skeleton of `framework` from `stack_root` into `output_root`.
/// Returns the written paths.
///
/// # Errors
/// * `Error::SkeletonNotFound` if the framework has no skeleton directory
pub fn copy_skeleton<P: AsRef<Path>, Q: AsRef<Path>>(
    stack_root: P,
    framework: &str,
    output_root: Q,
) -> Result<Vec<PathBuf>> {
    let source_root = skeleton_dir(&stack_root, framework);
    let output_root = output_root.as_ref();
    if !source_root.is_dir() {
        return Err(Error::SkeletonNotFound {
            framework: framework.to_string(),
            path: source_root.display().to_string(),
        });
    }

    let ignored = parse_ignore_file(&source_root)?;
    let mut written = Vec::new();

    for relative in list_files(&source_root, true)? {
        let relative_str = display_relative(&relative, Path::new(""));
        if ignored.is_match(&relative_str) {
            debug!("Skipping {} from ignore patterns", relative_str);
            continue;
        }

        let mut target_relative = relative.clone();
        if let Some(dotfile) = relative
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(dotfile_name)
        {
            if source_root.join(&relative).with_file_name(&dotfile).exists() {
                debug!("Skipping {}, the skeleton ships {} itself", relative_str, dotfile);
                continue;
            }
            target_relative.set_file_name(dotfile);
        }

        let target = output_root.join(&target_relative);
        copy_file(source_root.join(&relative), &target)?;
        written.push(target);
    }

    let env_file = output_root.join(ENV_FILE);
    let env_example = output_root.join(ENV_EXAMPLE_FILE);
    if !env_file.exists() && env_example.is_file() {
        debug!("Seeding {} from {}", ENV_FILE, ENV_EXAMPLE_FILE);
        copy_file(&env_example, &env_file)?;
        written.push(env_file);
    }

    debug!("Copied {} skeleton files for '{}'", written.len(), framework);
    Ok(written)
}
