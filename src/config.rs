//! Module descriptor handling.
//! Loads a module's generator descriptor and merges the aggregate metadata of
//! its companion descriptor into it. Descriptors may be JSON or YAML.

use crate::constants::{BUNDLE_DIR, GENERATOR_FILES, MODULE_FILES};
use crate::error::{Error, Result};
use crate::operation::Operation;
use indexmap::IndexMap;
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Category of a module. Each selection slot picks at most one module per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    Framework,
    Database,
    Auth,
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleType::Framework => write!(f, "framework"),
            ModuleType::Database => write!(f, "database"),
            ModuleType::Auth => write!(f, "auth"),
        }
    }
}

/// Declarations merged into the target project after all operations ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModuleMetadata {
    pub dependencies: IndexMap<String, String>,
    pub dev_dependencies: IndexMap<String, String>,
    pub scripts: IndexMap<String, String>,
    pub env_vars: IndexMap<String, String>,
    pub post_install: Vec<String>,
}

impl ModuleMetadata {
    /// Shallow merge; `other` wins on key conflicts, post-install commands are
    /// appended unless already listed.
    pub fn merge(&mut self, other: &ModuleMetadata) {
        extend(&mut self.dependencies, &other.dependencies);
        extend(&mut self.dev_dependencies, &other.dev_dependencies);
        extend(&mut self.scripts, &other.scripts);
        extend(&mut self.env_vars, &other.env_vars);
        for command in &other.post_install {
            if !self.post_install.contains(command) {
                self.post_install.push(command.clone());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
            && self.dev_dependencies.is_empty()
            && self.scripts.is_empty()
            && self.env_vars.is_empty()
            && self.post_install.is_empty()
    }
}

fn extend(target: &mut IndexMap<String, String>, source: &IndexMap<String, String>) {
    for (key, value) in source {
        target.insert(key.clone(), value.clone());
    }
}

/// Consumed by selection front-ends; the engine only warns on mismatches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Compatibility {
    pub frameworks: Vec<String>,
}

impl Compatibility {
    /// An empty list means "any framework".
    pub fn supports(&self, framework: &str) -> bool {
        self.frameworks.is_empty() || self.frameworks.iter().any(|f| f == framework)
    }
}

/// Companion descriptor (`module.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub metadata: ModuleMetadata,
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default)]
    pub compatibility: Compatibility,
}

/// Generator descriptor (`generator.json`) of one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub module_type: ModuleType,
    /// Lower runs first
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(flatten)]
    pub metadata: ModuleMetadata,
    /// Provider choices, first is the default
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default)]
    pub compatibility: Compatibility,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Directory the descriptor was loaded from
    #[serde(skip)]
    pub module_dir: PathBuf,
}

impl GeneratorConfig {
    pub fn new<S: Into<String>>(name: S, module_type: ModuleType) -> Self {
        Self {
            name: name.into(),
            module_type,
            priority: 0,
            operations: Vec::new(),
            metadata: ModuleMetadata::default(),
            providers: Vec::new(),
            compatibility: Compatibility::default(),
            display_name: None,
            module_dir: PathBuf::new(),
        }
    }

    /// Folds a companion descriptor in. The operation list is never touched.
    pub fn apply_descriptor(&mut self, descriptor: ModuleDescriptor) {
        self.metadata.merge(&descriptor.metadata);
        if self.providers.is_empty() {
            self.providers = descriptor.providers;
        }
        if self.compatibility.frameworks.is_empty() {
            self.compatibility = descriptor.compatibility;
        }
        if self.display_name.is_none() {
            self.display_name = descriptor.display_name;
        }
    }

    /// Priority of `operation` when run for this module.
    pub fn effective_priority(&self, operation: &Operation) -> i32 {
        operation.priority().unwrap_or(self.priority)
    }

    pub fn bundle_dir(&self) -> PathBuf {
        self.module_dir.join(BUNDLE_DIR)
    }

    /// Context variable carrying this module's provider, e.g. `prismaProvider`.
    pub fn provider_variable(&self) -> String {
        format!("{}Provider", self.name)
    }

    /// # Errors
    /// * `Error::MissingSource` if the file is not in the bundle
    pub fn read_bundle_file(&self, relative: &str) -> Result<String> {
        let path = self.bundle_dir().join(relative);
        if !path.is_file() {
            return Err(Error::MissingSource {
                module: self.name.clone(),
                source_path: relative.to_string(),
            });
        }
        Ok(std::fs::read_to_string(&path)?)
    }
}

/// Returns the first of `candidates` that exists in `dir`.
pub fn find_config_file<P: AsRef<Path>>(dir: P, candidates: &[&str]) -> Option<PathBuf> {
    candidates.iter().map(|file| dir.as_ref().join(file)).find(|path| path.is_file())
}

/// Loads configuration from a directory, trying multiple file names.
///
/// # Errors
/// * `Error::ConfigError` if no candidate file exists
pub fn load_config<P: AsRef<Path>>(dir: P, candidates: &[&str]) -> Result<String> {
    let Some(config_path) = find_config_file(&dir, candidates) else {
        return Err(Error::ConfigError(format!(
            "No configuration file found in '{}' (tried: {})",
            dir.as_ref().display(),
            candidates.join(", ")
        )));
    };
    debug!("Loading configuration from {}", config_path.display());
    Ok(std::fs::read_to_string(&config_path)?)
}

/// Parses a descriptor, trying JSON first and YAML second.
///
/// # Errors
/// * `Error::ConfigError` if neither format accepts the content
pub fn parse_document<T: DeserializeOwned>(content: &str, origin: &str) -> Result<T> {
    match serde_json::from_str(content) {
        Ok(value) => Ok(value),
        Err(_) => serde_yaml::from_str(content).map_err(|e| {
            Error::ConfigError(format!("Invalid descriptor '{}': {}", origin, e))
        }),
    }
}

/// Loads a module directory's generator and merges its companion descriptor.
///
/// # Errors
/// * `Error::ConfigError` if the generator descriptor is missing or malformed
pub fn load_generator<P: AsRef<Path>>(module_dir: P) -> Result<GeneratorConfig> {
    let module_dir = module_dir.as_ref();
    let origin = module_dir.display().to_string();

    let content = load_config(module_dir, &GENERATOR_FILES)?;
    let mut config: GeneratorConfig = parse_document(&content, &origin)?;
    config.module_dir = module_dir.to_path_buf();

    if find_config_file(module_dir, &MODULE_FILES).is_some() {
        let content = load_config(module_dir, &MODULE_FILES)?;
        let descriptor: ModuleDescriptor = parse_document(&content, &origin)?;
        config.apply_descriptor(descriptor);
    }

    debug!(
        "Loaded {} module '{}' with {} operations",
        config.module_type,
        config.name,
        config.operations.len()
    );
    Ok(config)
}
