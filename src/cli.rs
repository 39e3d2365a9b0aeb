//! Command-line interface.
//! Provides argument parsing and help text formatting using clap.

use crate::constants::NONE_SELECTION;
use crate::context::Selection;
use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(author, version, about = "Stackgen: compose a project from a framework skeleton and modules", long_about = None)]
pub struct Args {
    /// Directory holding `templates/` and `modules/`
    #[arg(value_name = "STACK_DIR")]
    pub stack_dir: PathBuf,

    /// Directory where the generated project will be created
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Framework skeleton to start from
    #[arg(long)]
    pub framework: String,

    /// Database module, or `none`
    #[arg(long, default_value = NONE_SELECTION)]
    pub database: String,

    /// Auth module, or `none`
    #[arg(long, default_value = NONE_SELECTION)]
    pub auth: String,

    /// Provider for modules that offer several (e.g. postgresql)
    #[arg(long)]
    pub provider: Option<String>,

    /// Optional feature flag; repeat or separate with commas
    #[arg(long = "feature", value_delimiter = ',')]
    pub features: Vec<String>,

    /// Force overwrite of existing output directory
    #[arg(short, long)]
    pub force: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn selection(&self) -> Selection {
        let mut selection = Selection::new(&self.framework)
            .with_database(&self.database)
            .with_auth(&self.auth)
            .with_features(self.features.iter().map(|f| f.trim()).filter(|f| !f.is_empty()));
        if let Some(provider) = &self.provider {
            selection = selection.with_provider(provider);
        }
        selection
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
