//! Log entry domain type.
//!
//! A `LogEntry` is one displayed line. The display text is fixed at creation
//! and already carries the source annotation, so renderers never need to
//! know how an entry was produced.

use std::fmt;
use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Lifecycle line: listening, connection opened/closed, bind failures.
    Status,
    /// A newline-terminated line received from a peer.
    Message,
    /// A per-connection failure.
    Error,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status => write!(f, "status"),
            Self::Message => write!(f, "message"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One immutable, ordered line of the relay log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Position in append order (0-based, never reused).
    pub seq: u64,
    pub kind: EntryKind,
    /// Connection this entry is attributed to, if any.
    pub peer: Option<SocketAddr>,
    /// Raw line or status text, without annotation.
    pub body: String,
    /// Display text including the source annotation.
    pub text: String,
    /// Time the entry was appended. Informational only; `seq` defines order.
    pub received_at: DateTime<Utc>,
}

impl LogEntry {
    pub(crate) fn new(seq: u64, kind: EntryKind, peer: Option<SocketAddr>, body: String) -> Self {
        let text = render_text(kind, peer, &body);
        Self {
            seq,
            kind,
            peer,
            body,
            text,
            received_at: Utc::now(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Messages and errors are prefixed with the peer; status lines embed it
/// themselves.
fn render_text(kind: EntryKind, peer: Option<SocketAddr>, body: &str) -> String {
    match (kind, peer) {
        (EntryKind::Message | EntryKind::Error, Some(addr)) => format!("{addr}: {body}"),
        _ => body.to_string(),
    }
}

/// Status line emitted once the listener is bound.
pub fn listening_text(addr: SocketAddr) -> String {
    format!("Listening on {addr}")
}

/// Status line emitted when a connection is accepted.
pub fn connection_opened_text(peer: SocketAddr) -> String {
    format!("Connection from {peer}")
}

/// Status line emitted exactly once when a connection ends.
pub fn connection_closed_text(peer: SocketAddr) -> String {
    format!("Closed connection from {peer}")
}

/// Body of an error entry attributed to a connection.
pub fn error_text(description: impl fmt::Display) -> String {
    format!("Error: {description}")
}
