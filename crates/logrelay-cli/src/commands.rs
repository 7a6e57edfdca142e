//! Subcommand definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use logrelay_core::{DEFAULT_BIND_ADDRESS, DEFAULT_PORT, DEFAULT_SEND_HOST, Settings};

/// Message sent when `logrelay send` gets no words.
pub const DEFAULT_MESSAGE: &str = "Hello from logrelay client";

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the relay with the full-screen log viewer (default)
    View(ViewArgs),

    /// Run the relay headless, printing each entry to stdout
    Tail(TailArgs),

    /// Send one line to a running relay
    Send(SendArgs),
}

/// Listener options shared by `view` and `tail`.
#[derive(Args, Debug, Clone)]
pub struct RelayArgs {
    /// Address to bind the relay to
    #[arg(long = "bind", env = "LOGRELAY_BIND", default_value = DEFAULT_BIND_ADDRESS)]
    pub bind_address: String,

    /// Port to listen on
    #[arg(short, long, env = "LOGRELAY_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Close connections that send more than this many bytes without a newline
    #[arg(long, env = "LOGRELAY_MAX_LINE_BYTES")]
    pub max_line_bytes: Option<usize>,

    /// Keep at most this many entries, dropping the oldest
    #[arg(long, env = "LOGRELAY_MAX_ENTRIES")]
    pub max_entries: Option<usize>,
}

impl RelayArgs {
    pub fn to_settings(&self) -> Settings {
        Settings {
            bind_address: Some(self.bind_address.clone()),
            port: Some(self.port),
            max_line_bytes: self.max_line_bytes,
            max_entries: self.max_entries,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    #[command(flatten)]
    pub relay: RelayArgs,

    /// Write diagnostics to this file (the terminal belongs to the viewer)
    #[arg(long, env = "LOGRELAY_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct TailArgs {
    #[command(flatten)]
    pub relay: RelayArgs,

    /// Print each entry as a JSON object
    #[arg(long)]
    pub json: bool,

    /// Prefix each line with the time it was received
    #[arg(long, conflicts_with = "json")]
    pub timestamps: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SendArgs {
    /// Relay host
    #[arg(long, env = "LOGRELAY_HOST", default_value = DEFAULT_SEND_HOST)]
    pub host: String,

    /// Relay port
    #[arg(short, long, env = "LOGRELAY_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Message words, joined with spaces
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub message: Vec<String>,
}

impl SendArgs {
    /// The message text: words joined with spaces, or the default.
    pub fn message_text(&self) -> String {
        if self.message.is_empty() {
            DEFAULT_MESSAGE.to_string()
        } else {
            self.message.join(" ")
        }
    }
}
