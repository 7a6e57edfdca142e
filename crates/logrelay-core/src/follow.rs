//! Cursor-based following of a [`LogSink`].
//!
//! Broadcast notifications may lag for slow consumers. The follower treats
//! them only as wake-ups and reads the entries themselves from the sink, so
//! a renderer never skips or duplicates a line.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};

use crate::entry::LogEntry;
use crate::sink::LogSink;

/// Reads a sink's entries in order, waiting for new ones as needed.
pub struct LogFollower {
    sink: Arc<LogSink>,
    rx: broadcast::Receiver<LogEntry>,
    cursor: u64,
}

impl LogFollower {
    /// Follow from the first retained entry.
    pub fn from_start(sink: Arc<LogSink>) -> Self {
        // Subscribe before reading so no append can slip between the two.
        let rx = sink.subscribe();
        Self {
            sink,
            rx,
            cursor: 0,
        }
    }

    /// Entries appended since the last call, without waiting.
    pub fn try_batch(&mut self) -> Vec<LogEntry> {
        let batch = self.sink.since(self.cursor);
        if let Some(last) = batch.last() {
            self.cursor = last.seq + 1;
        }
        batch
    }

    /// Wait for at least one new entry and return everything pending.
    ///
    /// Cancel-safe: dropping the future loses no entries. Returns `None`
    /// only if the notification channel closed.
    pub async fn next_batch(&mut self) -> Option<Vec<LogEntry>> {
        loop {
            let batch = self.try_batch();
            if !batch.is_empty() {
                return Some(batch);
            }
            match self.rx.recv().await {
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Sequence number of the next entry this follower will return.
    pub const fn cursor(&self) -> u64 {
        self.cursor
    }
}
