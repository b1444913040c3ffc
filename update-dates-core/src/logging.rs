use std::path::Path;

use color_eyre::Result;
use tracing::debug;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config;

lazy_static::lazy_static! {
    pub static ref LOG_ENV: String = format!("{}_LOGLEVEL", config::PROJECT_NAME.clone());
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

/// Logs to a file in the data directory.
///
/// # Errors
///
/// Will return an error if the log file can't be created or if a global
/// subscriber is already set.
pub fn init() -> Result<()> {
    init_in(&config::get_data_dir())
}

/// Logs to a file in `directory`.
///
/// # Errors
///
/// See [`init`].
pub fn init_in(directory: &Path) -> Result<()> {
    std::fs::create_dir_all(directory)?;
    let log_path = directory.join(LOG_FILE.as_str());
    let log_file = std::fs::File::create(&log_path)?;

    let builder = EnvFilter::builder().with_default_directive(tracing::Level::INFO.into());

    // RUST_LOG first, then our own variable, then INFO
    let env_filter = builder
        .try_from_env()
        .or_else(|_| builder.clone().with_env_var(LOG_ENV.as_str()).try_from_env())
        .unwrap_or_else(|_| {
            EnvFilter::builder()
                .with_default_directive(tracing::Level::INFO.into())
                .parse_lossy("")
        });

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
        .try_init()?;

    debug!("Logging initialized. Log file: {}", log_path.display());
    Ok(())
}
