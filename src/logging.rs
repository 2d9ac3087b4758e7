//! Tracing subscriber setup.
//!
//! The client logs through `tracing` everywhere; this module only decides
//! where the lines end up. `RUST_LOG` takes precedence over the configured
//! level so a single run can be made more verbose without editing app.yaml.

use crate::config::LoggingConfig;
use crate::error::{Error, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_PREFIX: &str = "caller.log";

/// Build the filter for a logging section, honoring `RUST_LOG` first.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_filter()))
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the program when file output is enabled.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let console_layer = config
        .output
        .to_console()
        .then(|| fmt::layer().with_writer(std::io::stderr));

    let (file_layer, guard) = if config.output.to_file() {
        std::fs::create_dir_all(&config.file_path)?;
        let appender = tracing_appender::rolling::daily(&config.file_path, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (
            Some(fmt::layer().with_writer(writer).with_ansi(false)),
            Some(guard),
        )
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to install log subscriber: {}", e)))?;

    Ok(guard)
}
