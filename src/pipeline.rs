//! Generation pipeline: selects the applicable operations of every selected
//! module, orders them by priority and applies them one after another.
//!
//! There is no rollback. A fatal error stops the run and leaves whatever the
//! operations applied so far wrote on disk.

use crate::condition;
use crate::config::{GeneratorConfig, ModuleMetadata, ModuleType};
use crate::constants::{ENV_FILE, MODULES_DIR, PACKAGE_MANIFEST};
use crate::context::{ContextValue, GenerationContext, Selection};
use crate::error::Result;
use crate::executor::{Effect, Executor};
use crate::manifest::{merge_env_file, merge_json_section};
use crate::operation::Operation;
use crate::registry::GeneratorRegistry;
use crate::renderer::{DirectiveRenderer, TemplateRenderer};
use crate::skeleton::copy_skeleton;
use indexmap::IndexMap;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// What a run produced, handed to the dependency installer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Queued `run-command`s in execution order, then module post-install commands
    pub commands: Vec<String>,
    pub dependencies: IndexMap<String, String>,
    pub dev_dependencies: IndexMap<String, String>,
    /// Files created from the skeleton or by `create-file` operations
    pub written: Vec<PathBuf>,
}

/// An operation selected for a run, with the priority it runs at.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledOperation<'r> {
    pub operation: &'r Operation,
    pub owner: &'r GeneratorConfig,
    pub priority: i32,
}

/// Collects the operations whose condition holds and stable-sorts them by
/// priority, so ties keep registry and declaration order.
pub fn schedule<'r>(
    generators: &[&'r GeneratorConfig],
    context: &GenerationContext,
) -> Vec<ScheduledOperation<'r>> {
    let mut scheduled: Vec<ScheduledOperation<'r>> = generators
        .iter()
        .flat_map(|owner| {
            owner.operations.iter().map(move |operation| ScheduledOperation {
                operation,
                owner,
                priority: owner.effective_priority(operation),
            })
        })
        .filter(|s| {
            let keep = condition::matches(s.operation.condition(), context);
            if !keep {
                debug!("Skipping {} of '{}': condition not met", s.operation.kind(), s.owner.name);
            }
            keep
        })
        .collect();

    scheduled.sort_by_key(|s| s.priority);
    scheduled
}

/// Builds the run context, adding a `<module>Provider` variable for every
/// selected module that declares providers. The database module's resolved
/// provider also becomes the context's `provider`.
pub fn build_context(selection: &Selection, generators: &[&GeneratorConfig]) -> GenerationContext {
    let mut context = GenerationContext::from_selection(selection);

    for generator in generators.iter().filter(|g| !g.providers.is_empty()) {
        let provider = match &selection.provider {
            Some(wanted) if generator.providers.contains(wanted) => wanted.clone(),
            Some(wanted) => {
                warn!(
                    "Module '{}' has no provider '{}', using '{}'",
                    generator.name, wanted, generator.providers[0]
                );
                generator.providers[0].clone()
            }
            None => generator.providers[0].clone(),
        };
        if generator.module_type == ModuleType::Database {
            context.provider = Some(provider.clone());
        }
        context.define(generator.provider_variable(), ContextValue::Text(provider));
    }
    context
}

pub struct Pipeline<'a> {
    engine: &'a dyn TemplateRenderer,
    registry: &'a GeneratorRegistry,
    stack_root: Option<PathBuf>,
}

impl<'a> Pipeline<'a> {
    pub fn new(engine: &'a dyn TemplateRenderer, registry: &'a GeneratorRegistry) -> Self {
        Self { engine, registry, stack_root: None }
    }

    /// Copies `<stack_root>/templates/<framework>` into the output before
    /// applying operations. Without it the output must already hold the skeleton.
    pub fn with_skeletons<P: Into<PathBuf>>(mut self, stack_root: P) -> Self {
        self.stack_root = Some(stack_root.into());
        self
    }

    /// Runs one generation into `output_root`.
    ///
    /// # Errors
    /// Any fatal executor error, a missing skeleton, or an unwritable manifest.
    pub fn generate(&self, selection: &Selection, output_root: &Path) -> Result<GenerationReport> {
        let mut report = GenerationReport::default();

        if let Some(stack_root) = &self.stack_root {
            info!("Copying '{}' skeleton", selection.framework);
            report.written.extend(copy_skeleton(stack_root, &selection.framework, output_root)?);
        }

        let generators = self.registry.selected(selection);
        let mut context = build_context(selection, &generators);
        let scheduled = schedule(&generators, &context);
        info!(
            "Applying {} operations from {} modules",
            scheduled.len(),
            generators.len()
        );

        let executor = Executor::new(self.engine, output_root);
        for step in &scheduled {
            debug!(
                "[{}] {} from '{}'",
                step.priority,
                step.operation.kind(),
                step.owner.name
            );
            match executor.apply(step.operation, step.owner, &mut context)? {
                Effect::Written(paths) => report.written.extend(paths),
                Effect::Queued(command) => report.commands.push(command),
                Effect::Patched(_) | Effect::Merged(_) | Effect::Skipped => {}
            }
        }

        let mut aggregate = ModuleMetadata::default();
        for generator in &generators {
            aggregate.merge(&generator.metadata);
        }
        self.merge_aggregate(&aggregate, output_root, &mut context)?;

        report.commands.extend(aggregate.post_install.iter().cloned());
        report.dependencies = aggregate.dependencies;
        report.dev_dependencies = aggregate.dev_dependencies;
        info!("Generation finished with {} post-install commands", report.commands.len());
        Ok(report)
    }

    fn merge_aggregate(
        &self,
        aggregate: &ModuleMetadata,
        output_root: &Path,
        context: &mut GenerationContext,
    ) -> Result<()> {
        let manifest = output_root.join(PACKAGE_MANIFEST);
        merge_json_section(&manifest, "dependencies", &aggregate.dependencies)?;
        merge_json_section(&manifest, "devDependencies", &aggregate.dev_dependencies)?;
        merge_json_section(&manifest, "scripts", &aggregate.scripts)?;

        let mut env_vars = IndexMap::new();
        for (key, value) in &aggregate.env_vars {
            env_vars.insert(key.clone(), self.engine.render(value, context)?);
        }
        merge_env_file(output_root.join(ENV_FILE), &env_vars)
    }
}

/// Loads every module under `<stack_root>/modules` and runs a full generation,
/// skeleton included.
pub fn generate<P: AsRef<Path>, Q: AsRef<Path>>(
    stack_root: P,
    selection: &Selection,
    output_root: Q,
) -> Result<GenerationReport> {
    let stack_root = stack_root.as_ref();
    let registry = GeneratorRegistry::load_all([stack_root.join(MODULES_DIR)])?;
    let engine = DirectiveRenderer::new();

    Pipeline::new(&engine, &registry)
        .with_skeletons(stack_root)
        .generate(selection, output_root.as_ref())
}
