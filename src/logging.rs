use std::{env, fs::File, io, path::PathBuf};

use color_eyre::{Result, eyre::Context};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::Config;

/// Environment variable overriding the configured log filter
pub const LOG_ENV_VAR: &str = "HERALD_LOG";

/// Resolves the log file and filter based on the config and environment variable.
/// If logging is disabled, returns `None` for the filter.
pub fn resolve_file_and_filter(config: &Config) -> (Option<PathBuf>, Option<String>) {
    let env_filter = env::var(LOG_ENV_VAR).ok();
    let filter = (config.logs.enabled || env_filter.is_some())
        .then(|| env_filter.unwrap_or_else(|| config.logs.filter.clone()));
    (config.logs.file.clone(), filter)
}

/// Initializes the tracing subscriber to output logs to the given file, or the standard error
pub fn init(log_file: Option<PathBuf>, filter: Option<String>) -> Result<()> {
    let Some(filter) = filter else {
        return Ok(());
    };

    // Initialize the env filter
    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .parse(filter)
        .wrap_err("Couldn't parse the log filter")?;

    match log_file {
        Some(log_path) => {
            // Subscribe logs to the file
            let log_file = File::create(&log_path)
                .wrap_err_with(|| format!("Couldn't create the log file: {}", log_path.display()))?;
            let file_subscriber = fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_writer(log_file)
                .with_target(false)
                .with_ansi(false)
                .with_filter(env_filter);
            tracing_subscriber::registry()
                .with(file_subscriber)
                .with(ErrorLayer::default())
                .init();
        }
        None => {
            // Subscribe logs to the standard error, as stdout is reserved for the command output
            let stderr_subscriber = fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_filter(env_filter);
            tracing_subscriber::registry()
                .with(stderr_subscriber)
                .with(ErrorLayer::default())
                .init();
        }
    }

    Ok(())
}
