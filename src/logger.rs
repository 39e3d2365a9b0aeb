use log::LevelFilter;

/// Initializes `env_logger`. `RUST_LOG` still overrides the chosen level.
pub fn init_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose { LevelFilter::Debug } else { LevelFilter::Info })
        .parse_default_env()
        .format_timestamp(None)
        .init();
}
