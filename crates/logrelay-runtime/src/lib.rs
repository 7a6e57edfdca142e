//! Networking runtime for logrelay.
//!
//! - [`listener`]: bind and accept loop
//! - [`connection`]: per-connection read-and-split handler
//! - [`supervisor`]: start/stop/status around a running listener
//! - [`sender`]: one-shot line sender
#![deny(unused_crate_dependencies)]

pub mod connection;
pub mod listener;
pub mod sender;
pub mod supervisor;

pub use connection::{CloseReason, handle_connection};
pub use listener::{RelayListener, start_relay};
pub use sender::send_message;
pub use supervisor::{RelayStatus, RelaySupervisor, SupervisorError};

// Re-export so frontends only need one cancellation type in scope.
pub use tokio_util::sync::CancellationToken;
