//! Core domain types for logrelay.
//!
//! Everything here is free of networking: log entries, the shared sink,
//! newline splitting, settings and the error taxonomy.
#![deny(unused_crate_dependencies)]

pub mod entry;
pub mod error;
pub mod follow;
pub mod settings;
pub mod sink;
pub mod splitter;

pub use entry::{
    EntryKind, LogEntry, connection_closed_text, connection_opened_text, error_text,
    listening_text,
};
pub use error::{RelayError, SendError};
pub use follow::LogFollower;
pub use settings::{
    ConnectionLimits, DEFAULT_BIND_ADDRESS, DEFAULT_PORT, DEFAULT_SEND_HOST, Settings,
    SettingsError, validate_settings,
};
pub use sink::LogSink;
pub use splitter::LineSplitter;
