//! Command-line frontend for logrelay.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used only by the binary entry point.
use dotenvy as _;

pub mod commands;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;
pub mod tui;

pub use commands::{Commands, RelayArgs, SendArgs, TailArgs, ViewArgs};
pub use error::CliError;
pub use logging::{LogDestination, init_logging};
pub use parser::Cli;
