//! Dispatches one operation to its effect on the output tree.

use crate::config::GeneratorConfig;
use crate::constants::{ENV_FILE, PACKAGE_MANIFEST};
use crate::context::GenerationContext;
use crate::error::{Error, Result};
use crate::files::{copy_file, display_relative, list_files, write_file};
use crate::manifest::{merge_env_file, merge_json_section};
use crate::operation::{AddDependency, AddEnv, AddScript, CreateFile, Operation, PatchFile};
use crate::patch::{add_to_bottom, apply_patches};
use crate::path::{classify, PathMode};
use crate::renderer::TemplateRenderer;
use indexmap::IndexMap;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// What applying an operation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Written(Vec<PathBuf>),
    Patched(PathBuf),
    Merged(PathBuf),
    /// A command to run once generation has finished
    Queued(String),
    Skipped,
}

pub struct Executor<'a> {
    engine: &'a dyn TemplateRenderer,
    output_root: &'a Path,
}

impl<'a> Executor<'a> {
    pub fn new(engine: &'a dyn TemplateRenderer, output_root: &'a Path) -> Self {
        Self { engine, output_root }
    }

    /// Applies `operation`, contributed by `owner`, to the output tree.
    ///
    /// # Errors
    /// * `Error::MissingSource` if a create-file source is not in the module bundle
    /// * `Error::MissingPatchTarget` if a patch-file target does not exist
    /// * `Error::JsonError`/`Error::IoError` if a manifest cannot be read or written
    pub fn apply(
        &self,
        operation: &Operation,
        owner: &GeneratorConfig,
        context: &mut GenerationContext,
    ) -> Result<Effect> {
        match operation {
            Operation::CreateFile(op) => self.create_file(op, owner, context),
            Operation::PatchFile(op) => self.patch_file(op, owner, context),
            Operation::AddDependency(op) => self.add_dependency(op, context),
            Operation::AddScript(op) => self.add_script(op, context),
            Operation::AddEnv(op) => self.add_env(op, context),
            Operation::RunCommand(op) => {
                let command = self.engine.render(&op.command, context)?;
                debug!("Queued command '{}' from module '{}'", command, owner.name);
                Ok(Effect::Queued(command))
            }
            Operation::Unknown => {
                warn!("Module '{}' has an operation of unknown type, skipping", owner.name);
                Ok(Effect::Skipped)
            }
        }
    }

    fn create_file(
        &self,
        op: &CreateFile,
        owner: &GeneratorConfig,
        context: &mut GenerationContext,
    ) -> Result<Effect> {
        let destination = self.engine.render(&op.destination, context)?;
        let (dest_base, dest_mode) = classify(destination.trim());

        if let Some(content) = &op.content {
            let rendered = self.engine.render(content, context)?;
            let target = self.output_root.join(dest_base);
            write_file(&target, &rendered)?;
            debug!("Created {}", display_relative(&target, self.output_root));
            return Ok(Effect::Written(vec![target]));
        }

        let Some(source) = &op.source else {
            return Err(Error::ConfigError(format!(
                "create-file '{}' in module '{}' has neither content nor source",
                destination, owner.name
            )));
        };
        let source = self.engine.render(source, context)?;
        let (source_base, source_mode) = classify(source.trim());
        let source_path = owner.bundle_dir().join(source_base);
        if !source_path.exists() {
            return Err(Error::MissingSource {
                module: owner.name.clone(),
                source_path: source.clone(),
            });
        }

        if source_path.is_file() && !source_mode.is_wildcard() {
            let target = match dest_mode {
                PathMode::Single => self.output_root.join(dest_base),
                _ => self.output_root.join(dest_base).join(file_name(&source_path)),
            };
            self.materialize(&source_path, &target, context)?;
            return Ok(Effect::Written(vec![target]));
        }

        // A bare directory behaves like `dir/**`.
        let recursive = source_mode != PathMode::Flat;
        let mut written = Vec::new();
        for relative in list_files(&source_path, recursive)? {
            let target_relative = match dest_mode {
                PathMode::Flat => PathBuf::from(file_name(&relative)),
                _ => relative.clone(),
            };
            let target = self.output_root.join(dest_base).join(target_relative);
            self.materialize(&source_path.join(&relative), &target, context)?;
            written.push(target);
        }
        Ok(Effect::Written(written))
    }

    /// Renders text files into place; files that are not UTF-8 are copied as-is.
    fn materialize(
        &self,
        source: &Path,
        target: &Path,
        context: &mut GenerationContext,
    ) -> Result<()> {
        match String::from_utf8(fs::read(source)?) {
            Ok(text) => {
                let rendered = self.engine.render(&text, context)?;
                write_file(target, &rendered)?;
            }
            Err(_) => copy_file(source, target)?,
        }
        debug!("Created {}", display_relative(target, self.output_root));
        Ok(())
    }

    fn patch_file(
        &self,
        op: &PatchFile,
        owner: &GeneratorConfig,
        context: &mut GenerationContext,
    ) -> Result<Effect> {
        let file = self.engine.render(&op.file, context)?;
        let file = file.trim();
        let target = self.output_root.join(file);
        if !target.is_file() {
            return Err(Error::MissingPatchTarget { path: file.to_string() });
        }

        let mut text = fs::read_to_string(&target)?;
        if let Some(content) = &op.content {
            let rendered = self.engine.render(content, context)?;
            text = add_to_bottom(&text, &rendered);
        }
        let patched = apply_patches(&text, &op.operations, self.engine, context, owner, file)?;

        write_file(&target, &patched)?;
        debug!("Patched {}", file);
        Ok(Effect::Patched(target))
    }

    fn add_dependency(
        &self,
        op: &AddDependency,
        context: &mut GenerationContext,
    ) -> Result<Effect> {
        let target = self.manifest_path(op.file.as_deref(), PACKAGE_MANIFEST, context)?;
        merge_json_section(&target, "dependencies", &self.render_map(&op.dependencies, context)?)?;
        merge_json_section(
            &target,
            "devDependencies",
            &self.render_map(&op.dev_dependencies, context)?,
        )?;
        Ok(Effect::Merged(target))
    }

    fn add_script(&self, op: &AddScript, context: &mut GenerationContext) -> Result<Effect> {
        let target = self.manifest_path(op.file.as_deref(), PACKAGE_MANIFEST, context)?;
        merge_json_section(&target, "scripts", &self.render_map(&op.scripts, context)?)?;
        Ok(Effect::Merged(target))
    }

    fn add_env(&self, op: &AddEnv, context: &mut GenerationContext) -> Result<Effect> {
        let target = self.manifest_path(op.file.as_deref(), ENV_FILE, context)?;
        merge_env_file(&target, &self.render_map(&op.vars, context)?)?;
        Ok(Effect::Merged(target))
    }

    fn manifest_path(
        &self,
        file: Option<&str>,
        default: &str,
        context: &mut GenerationContext,
    ) -> Result<PathBuf> {
        let file = match file {
            Some(file) => self.engine.render(file, context)?,
            None => default.to_string(),
        };
        Ok(self.output_root.join(file.trim()))
    }

    fn render_map(
        &self,
        entries: &IndexMap<String, String>,
        context: &mut GenerationContext,
    ) -> Result<IndexMap<String, String>> {
        entries
            .iter()
            .map(|(key, value)| -> Result<(String, String)> {
                Ok((key.clone(), self.engine.render(value, context)?))
            })
            .collect()
    }
}

fn file_name(path: &Path) -> &std::ffi::OsStr {
    path.file_name().unwrap_or(path.as_os_str())
}
