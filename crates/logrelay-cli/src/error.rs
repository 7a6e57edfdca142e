//! CLI-specific error types and exit codes.

use logrelay_core::{RelayError, SettingsError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid configuration values.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The relay could not start.
    #[error("{0}")]
    Relay(String),

    /// Terminal or other I/O failure.
    #[error("IO error: {0}")]
    Io(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow sysexits.h where one fits.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 78, // EX_CONFIG
            Self::Relay(_) => 69,  // EX_UNAVAILABLE
            Self::Io(_) => 74,     // EX_IOERR
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<RelayError> for CliError {
    fn from(err: RelayError) -> Self {
        Self::Relay(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
