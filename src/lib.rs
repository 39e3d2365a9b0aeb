//! Stackgen assembles a project from a framework skeleton plus the module
//! generators (database, auth, ...) a user selects. Every module contributes
//! file operations whose contents go through a small directive template
//! language before landing in the output tree.

/// Command-line interface
pub mod cli;

/// Boolean conditions over the generation context
pub mod condition;

/// Generator descriptors and their loading
/// Supports JSON and YAML formats (generator.json, generator.yml, generator.yaml)
pub mod config;

pub mod constants;

/// Selection and the variables visible to templates
pub mod context;

/// Error types and handling
pub mod error;

/// Applies a single operation to the output tree
pub mod executor;

pub mod files;

pub mod logger;

/// `package.json` and `.env` merging
pub mod manifest;

/// Operation and patch-operation descriptors
pub mod operation;

/// Text patching of existing files
pub mod patch;

/// Wildcard suffixes on source and destination paths
pub mod path;

/// Orchestrates a full generation run
pub mod pipeline;

/// Discovery and lookup of module generators
pub mod registry;

/// The directive template language
pub mod renderer;

/// Framework skeleton copying
pub mod skeleton;
