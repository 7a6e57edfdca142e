//! Relay settings and validation.
//!
//! Pure domain types; the CLI layers flags, environment and `.env` on top.

use serde::{Deserialize, Serialize};

/// Default TCP port for the relay and the sender.
pub const DEFAULT_PORT: u16 = 9000;

/// Default bind address for the relay (all IPv4 interfaces).
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

/// Default host the sender connects to.
pub const DEFAULT_SEND_HOST: &str = "localhost";

/// Relay settings.
///
/// All fields are optional so partially specified configurations fall back
/// to defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Address the listener binds to.
    pub bind_address: Option<String>,

    /// Port the listener binds to. 0 asks the OS for an ephemeral port.
    pub port: Option<u16>,

    /// Maximum unterminated bytes buffered per connection. `None` = unbounded.
    pub max_line_bytes: Option<usize>,

    /// Maximum entries retained by the log sink. `None` = unbounded.
    pub max_entries: Option<usize>,
}

impl Settings {
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            bind_address: Some(DEFAULT_BIND_ADDRESS.to_string()),
            port: Some(DEFAULT_PORT),
            max_line_bytes: None,
            max_entries: None,
        }
    }

    /// Get the effective bind address (with default fallback).
    #[must_use]
    pub fn effective_bind_address(&self) -> &str {
        self.bind_address.as_deref().unwrap_or(DEFAULT_BIND_ADDRESS)
    }

    /// Get the effective port (with default fallback).
    #[must_use]
    pub const fn effective_port(&self) -> u16 {
        match self.port {
            Some(port) => port,
            None => DEFAULT_PORT,
        }
    }

    /// `host:port` string suitable for `TcpListener::bind`.
    ///
    /// Bare IPv6 literals are bracketed.
    #[must_use]
    pub fn bind_target(&self) -> String {
        let host = self.effective_bind_address();
        let port = self.effective_port();
        if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{port}")
        } else {
            format!("{host}:{port}")
        }
    }

    /// Per-connection limits derived from these settings.
    #[must_use]
    pub const fn connection_limits(&self) -> ConnectionLimits {
        ConnectionLimits {
            max_line_bytes: self.max_line_bytes,
        }
    }
}

/// Limits applied to every accepted connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionLimits {
    pub max_line_bytes: Option<usize>,
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Bind address cannot be empty")]
    EmptyBindAddress,

    #[error("Maximum line length must be at least 1 byte")]
    InvalidLineLimit,

    #[error("Maximum retained entries must be at least 1")]
    InvalidRetention,
}

/// Validate settings before starting the relay.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(ref addr) = settings.bind_address
        && addr.trim().is_empty()
    {
        return Err(SettingsError::EmptyBindAddress);
    }
    if settings.max_line_bytes == Some(0) {
        return Err(SettingsError::InvalidLineLimit);
    }
    if settings.max_entries == Some(0) {
        return Err(SettingsError::InvalidRetention);
    }
    Ok(())
}
