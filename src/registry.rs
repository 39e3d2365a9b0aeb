//! Discovery and lookup of module generators.

use crate::config::{find_config_file, load_generator, GeneratorConfig, ModuleType};
use crate::constants::GENERATOR_FILES;
use crate::context::Selection;
use crate::error::{Error, Result};
use log::{debug, warn};
use std::path::Path;
use walkdir::WalkDir;

/// All generators known to a run, in load order.
#[derive(Debug, Clone, Default)]
pub struct GeneratorRegistry {
    generators: Vec<GeneratorConfig>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every module directory under `module_roots`.
    ///
    /// A root may itself be a module directory, or contain modules up to two
    /// levels deep (`<type>/<name>`). Directories are visited in name order.
    ///
    /// # Errors
    /// * `Error::ConfigError` if a root is missing or a descriptor is malformed
    pub fn load_all<I, P>(module_roots: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut registry = Self::new();
        for root in module_roots {
            let root = root.as_ref();
            if !root.is_dir() {
                return Err(Error::ConfigError(format!(
                    "Module root '{}' is not a directory",
                    root.display()
                )));
            }

            for entry in WalkDir::new(root).max_depth(2).sort_by_file_name() {
                let entry = entry.map_err(|e| Error::IoError(e.into()))?;
                if !entry.file_type().is_dir() {
                    continue;
                }
                if find_config_file(entry.path(), &GENERATOR_FILES).is_none() {
                    debug!("No generator in {}, skipping", entry.path().display());
                    continue;
                }
                registry.register(load_generator(entry.path())?);
            }
        }
        Ok(registry)
    }

    /// Adds a generator. A generator with the same type and name is replaced.
    pub fn register(&mut self, config: GeneratorConfig) {
        if let Some(existing) = self
            .generators
            .iter_mut()
            .find(|g| g.module_type == config.module_type && g.name == config.name)
        {
            warn!(
                "{} module '{}' registered twice, keeping the later one",
                config.module_type, config.name
            );
            *existing = config;
        } else {
            self.generators.push(config);
        }
    }

    pub fn get(&self, module_type: ModuleType, name: &str) -> Option<&GeneratorConfig> {
        self.generators.iter().find(|g| g.module_type == module_type && g.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratorConfig> {
        self.generators.iter()
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Generators taking part in a run, in registry order. The framework
    /// generator is always considered; database and auth only when selected.
    /// Selected modules missing from the registry are reported and skipped.
    pub fn selected(&self, selection: &Selection) -> Vec<&GeneratorConfig> {
        let wanted = [
            (ModuleType::Framework, Some(selection.framework.as_str())),
            (ModuleType::Database, selection.has_database().then_some(selection.database.as_str())),
            (ModuleType::Auth, selection.has_auth().then_some(selection.auth.as_str())),
        ];

        for (module_type, name) in wanted {
            if let Some(name) = name {
                if self.get(module_type, name).is_none() {
                    warn!("No {} module named '{}', skipping its contribution", module_type, name);
                }
            }
        }

        self.generators
            .iter()
            .filter(|g| {
                wanted.iter().any(|(module_type, name)| {
                    g.module_type == *module_type && *name == Some(g.name.as_str())
                })
            })
            .inspect(|g| {
                if g.module_type != ModuleType::Framework
                    && !g.compatibility.supports(&selection.framework)
                {
                    warn!(
                        "{} module '{}' does not declare support for '{}'",
                        g.module_type, g.name, selection.framework
                    );
                }
            })
            .collect()
    }
}
