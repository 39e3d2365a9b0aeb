//! Read-modify-write merges of the target's package manifest and env file.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Shallow-merges `entries` into the object `section` of a JSON manifest.
/// Later values win. A missing manifest starts out as an empty object.
///
/// # Errors
/// * `Error::JsonError` if the manifest is not valid JSON or `section` is not an object
/// * `Error::IoError` if the manifest cannot be read or written
pub fn merge_json_section<P: AsRef<Path>>(
    path: P,
    section: &str,
    entries: &IndexMap<String, String>,
) -> Result<()> {
    if entries.is_empty() {
        return Ok(());
    }
    let path = path.as_ref();
    let mut document = read_json(path)?;

    let root = document.as_object_mut().ok_or_else(|| json_error(path, "root is not an object"))?;
    let target = root
        .entry(section.to_string())
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| json_error(path, &format!("'{}' is not an object", section)))?;

    for (key, value) in entries {
        target.insert(key.clone(), Value::String(value.clone()));
    }

    debug!("Merged {} entries into '{}' of {}", entries.len(), section, path.display());
    write_json(path, &document)
}

fn read_json(path: &Path) -> Result<Value> {
    if !path.exists() {
        debug!("{} does not exist, creating it", path.display());
        return Ok(Value::Object(Map::new()));
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|source| Error::JsonError { path: path.display().to_string(), source })
}

fn write_json(path: &Path, document: &Value) -> Result<()> {
    let mut content = serde_json::to_string_pretty(document)
        .map_err(|source| Error::JsonError { path: path.display().to_string(), source })?;
    content.push('\n');
    crate::files::write_file(path, &content)
}

fn json_error(path: &Path, message: &str) -> Error {
    Error::JsonError {
        path: path.display().to_string(),
        source: serde::de::Error::custom(message),
    }
}

/// Merges `KEY=VALUE` pairs into an env file. Existing keys are updated in
/// place, new keys appended in order. A missing file is created.
///
/// # Errors
/// * `Error::IoError` if the file cannot be read or written
pub fn merge_env_file<P: AsRef<Path>>(path: P, vars: &IndexMap<String, String>) -> Result<()> {
    if vars.is_empty() {
        return Ok(());
    }
    let path = path.as_ref();
    let existing = if path.exists() { fs::read_to_string(path)? } else { String::new() };

    let merged = merge_env_text(&existing, vars);
    debug!("Merged {} variables into {}", vars.len(), path.display());
    crate::files::write_file(path, &merged)
}

/// Pure text form of [`merge_env_file`].
pub fn merge_env_text(existing: &str, vars: &IndexMap<String, String>) -> String {
    let mut pending = vars.clone();
    let mut lines: Vec<String> = existing
        .lines()
        .map(|line| match env_key(line) {
            Some(key) => match pending.shift_remove(key) {
                Some(value) => format!("{}={}", key, value),
                None => line.to_string(),
            },
            None => line.to_string(),
        })
        .collect();

    for (key, value) in pending {
        lines.push(format!("{}={}", key, value));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn env_key(line: &str) -> Option<&str> {
    let line = line.trim_start();
    if line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    line.split_once('=').map(|(key, _)| key.trim()).filter(|key| !key.is_empty())
}
