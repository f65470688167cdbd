//! Logger initialisation
//!
//! Routes the `log` facade either to stderr through `env_logger` or, on
//! macOS, to the Unified Logging System under the app subsystem

use anyhow::Result;
use env_logger::{Builder, Target};
use log::{LevelFilter, Log};

use crate::config::LogBackend;

/// stderr logger filtered at `level`, with millisecond timestamps
pub fn stderr_logger(level: LevelFilter) -> env_logger::Logger {
    Builder::new()
        .filter_level(level)
        .target(Target::Stderr)
        .format_timestamp_millis()
        .build()
}

/// Install the global logger. May only be called once per process.
pub fn init_logging(level: LevelFilter, backend: LogBackend) -> Result<()> {
    let logger: Box<dyn Log> = match backend {
        LogBackend::Stderr => Box::new(stderr_logger(level)),
        LogBackend::Unified => unified_logger()?,
    };

    log::set_boxed_logger(logger).map_err(|e| anyhow::anyhow!("Failed to set logger: {}", e))?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(target_os = "macos")]
fn unified_logger() -> Result<Box<dyn Log>> {
    use crate::constants::APP_SUBSYSTEM;
    Ok(Box::new(oslog::OsLogger::new(APP_SUBSYSTEM)))
}

#[cfg(not(target_os = "macos"))]
fn unified_logger() -> Result<Box<dyn Log>> {
    anyhow::bail!("Unified Logging is only available on macOS")
}

/// Level after applying `--quiet` / `--verbose` on top of the configured one
pub fn effective_level(configured: LevelFilter, quiet: bool, verbose: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else if verbose {
        configured.max(LevelFilter::Debug)
    } else {
        configured
    }
}
