//! Classification of create-file source and destination paths.

/// How a path fans out over files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMode {
    /// A single named file
    Single,
    /// `dir/*`: the immediate files of `dir`, subdirectory structure discarded
    Flat,
    /// `dir/**`: every file under `dir`, relative structure preserved
    Recursive,
}

impl PathMode {
    pub fn is_wildcard(self) -> bool {
        self != PathMode::Single
    }
}

/// Splits a path pattern into its base path and [`PathMode`].
///
/// ```
/// use stackgen::path::{classify, PathMode};
///
/// assert_eq!(classify("files/lib/**"), ("files/lib", PathMode::Recursive));
/// assert_eq!(classify("files/lib/*"), ("files/lib", PathMode::Flat));
/// assert_eq!(classify("lib/db.ts"), ("lib/db.ts", PathMode::Single));
/// ```
pub fn classify(pattern: &str) -> (&str, PathMode) {
    if let Some(base) = pattern.strip_suffix("/**") {
        (base, PathMode::Recursive)
    } else if let Some(base) = pattern.strip_suffix("/*") {
        (base, PathMode::Flat)
    } else if pattern == "**" {
        ("", PathMode::Recursive)
    } else if pattern == "*" {
        ("", PathMode::Flat)
    } else {
        (pattern, PathMode::Single)
    }
}
