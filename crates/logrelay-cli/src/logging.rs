//! Diagnostic logging setup.
//!
//! Diagnostics are separate from the relay log: they go through `tracing`
//! and never reach the sink.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Where diagnostics are written.
#[derive(Debug, Clone)]
pub enum LogDestination {
    Stderr,
    /// Append to a file.
    File(PathBuf),
    /// Drop everything (the viewer owns the terminal).
    Discard,
}

/// Initialize the global subscriber. `RUST_LOG` overrides the default level.
pub fn init_logging(verbose: bool, destination: LogDestination) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match destination {
        LogDestination::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogDestination::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        LogDestination::Discard => builder.with_writer(std::io::sink).try_init(),
    };
    result.map_err(|e| anyhow!("failed to initialize logging: {e}"))
}

const fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}
