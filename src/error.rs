//! Error handling for stackgen.
//! Defines the error type and result alias used throughout the generation engine.

use std::io;
use thiserror::Error;

/// Errors that abort a generation run.
///
/// Conditions the engine treats as non-fatal (unmatched anchors, unknown
/// operation types, unselected modules) are logged instead and never surface here.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// Represents errors in a JSON document such as the target package manifest
    #[error("JSON error in '{path}': {source}.")]
    JsonError { path: String, source: serde_json::Error },

    /// Represents errors that occur during template parsing
    #[error("Template error: {0}.")]
    TemplateError(String),

    /// Represents errors that occur while loading module descriptors
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// A create-file operation names a source that is not in the module bundle
    #[error("Module '{module}' has no source file '{source_path}'.")]
    MissingSource { module: String, source_path: String },

    /// A patch-file operation targets a file that was never created
    #[error("Cannot patch '{path}': file does not exist.")]
    MissingPatchTarget { path: String },

    /// The base skeleton for the selected framework is missing
    #[error("No base skeleton for framework '{framework}' at '{path}'.")]
    SkeletonNotFound { framework: String, path: String },

    /// The output directory already exists and `force` was not given
    #[error("Output directory '{output_dir}' already exists. Use --force to overwrite it.")]
    OutputDirectoryExistsError { output_dir: String },

    /// Represents errors in ignore glob patterns
    #[error("Ignore pattern error: {0}.")]
    IgnoreError(String),
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The Error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{}", err);
    std::process::exit(1);
}
