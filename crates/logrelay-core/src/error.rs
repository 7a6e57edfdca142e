//! Error types for the relay and the sender.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors raised on the relay side.
///
/// Only `Bind` ever leaves the listener; the per-connection variants are
/// recorded in the log and end that connection alone.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The listener could not acquire its address.
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// Reading from a connection failed.
    #[error("{source}")]
    Connection {
        peer: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// A peer sent more unterminated bytes than the configured limit.
    #[error("line exceeds {limit} bytes without a newline")]
    LineTooLong { limit: usize },
}

/// Errors from the one-shot sender.
#[derive(Debug, Error)]
pub enum SendError {
    /// Nothing is listening at the target address.
    #[error("Could not connect to {host}:{port}. Is the TUI running?")]
    ConnectionRefused { host: String, port: u16 },

    /// Any other socket failure.
    #[error("{0}")]
    Io(#[from] io::Error),
}

impl SendError {
    /// Classify a connect-phase I/O error.
    pub fn from_connect(err: io::Error, host: &str, port: u16) -> Self {
        if err.kind() == io::ErrorKind::ConnectionRefused {
            Self::ConnectionRefused {
                host: host.to_string(),
                port,
            }
        } else {
            Self::Io(err)
        }
    }
}
