//! Stackgen's main application entry point.
//! Parses arguments, runs the generation pipeline and reports what was produced.

use stackgen::{
    cli::{get_args, Args},
    constants::MODULES_DIR,
    error::{default_error_handler, Result},
    files::display_relative,
    logger::init_logger,
    pipeline::Pipeline,
    registry::GeneratorRegistry,
    renderer::DirectiveRenderer,
    skeleton::ensure_output_dir,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Validates the output directory
/// 2. Loads the module generators of the stack
/// 3. Copies the framework skeleton and applies module operations
/// 4. Prints created files and the commands left to run
fn run(args: Args) -> Result<()> {
    let output_root = ensure_output_dir(&args.output_dir, args.force)?;
    let selection = args.selection();

    let registry = GeneratorRegistry::load_all([args.stack_dir.join(MODULES_DIR)])?;
    log::debug!("Loaded {} module generators", registry.len());

    let engine = DirectiveRenderer::new();
    let report = Pipeline::new(&engine, &registry)
        .with_skeletons(&args.stack_dir)
        .generate(&selection, &output_root)?;

    for path in &report.written {
        println!("created: '{}'", display_relative(path, &output_root));
    }
    if !report.commands.is_empty() {
        println!("\nNext steps:");
        for command in &report.commands {
            println!("  {}", command);
        }
    }

    println!("Project generation completed successfully in {}.", output_root.display());
    Ok(())
}
