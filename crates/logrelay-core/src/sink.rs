//! Append-only, observable relay log.
//!
//! The sink is the only structure shared between connection handlers. A
//! single mutex covers sequence assignment, storage and notification, so the
//! order subscribers observe always matches the stored order.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::trace;

use crate::entry::{EntryKind, LogEntry};

/// Broadcast channel capacity for append notifications.
///
/// Slow subscribers that fall further behind see `RecvError::Lagged` and
/// should resync with [`LogSink::since`].
const CHANNEL_CAPACITY: usize = 1024;

struct SinkState {
    entries: VecDeque<LogEntry>,
    next_seq: u64,
}

/// Ordered log of entries shared by the listener and every handler.
pub struct LogSink {
    state: Mutex<SinkState>,
    /// Maximum retained entries; oldest are evicted first. `None` = unbounded.
    max_entries: Option<usize>,
    notify_tx: broadcast::Sender<LogEntry>,
}

impl LogSink {
    /// Create an unbounded sink.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a sink that retains at most `max_entries` entries.
    ///
    /// A limit of zero is treated as one; the sink always keeps the newest
    /// entry so renderers have something to show.
    pub fn with_retention(max_entries: usize) -> Self {
        Self::build(Some(max_entries.max(1)))
    }

    fn build(max_entries: Option<usize>) -> Self {
        let (notify_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(SinkState {
                entries: VecDeque::new(),
                next_seq: 0,
            }),
            max_entries,
            notify_tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SinkState> {
        // Appends never leave the state half-written, so a poisoned lock is safe to reuse.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append one entry and notify subscribers. Returns the stored entry.
    pub fn append(&self, kind: EntryKind, peer: Option<SocketAddr>, body: String) -> LogEntry {
        let mut state = self.lock();
        let entry = LogEntry::new(state.next_seq, kind, peer, body);
        state.next_seq += 1;

        if let Some(max) = self.max_entries {
            while state.entries.len() >= max {
                state.entries.pop_front();
            }
        }
        state.entries.push_back(entry.clone());

        trace!(seq = entry.seq, kind = %entry.kind, "log entry appended");
        // No receivers is fine; the entry is stored either way.
        let _ = self.notify_tx.send(entry.clone());
        entry
    }

    /// Append a status line not attributed to any connection.
    pub fn status(&self, text: impl Into<String>) -> LogEntry {
        self.append(EntryKind::Status, None, text.into())
    }

    /// Append a status line attributed to `peer`.
    pub fn peer_status(&self, peer: SocketAddr, text: impl Into<String>) -> LogEntry {
        self.append(EntryKind::Status, Some(peer), text.into())
    }

    /// Append a received line.
    pub fn message(&self, peer: SocketAddr, line: impl Into<String>) -> LogEntry {
        self.append(EntryKind::Message, Some(peer), line.into())
    }

    /// Append a per-connection error.
    pub fn error(&self, peer: SocketAddr, text: impl Into<String>) -> LogEntry {
        self.append(EntryKind::Error, Some(peer), text.into())
    }

    /// Subscribe to append notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.notify_tx.subscribe()
    }

    /// All retained entries in display order.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.lock().entries.iter().cloned().collect()
    }

    /// Retained entries with `seq >= from`, in display order.
    pub fn since(&self, from: u64) -> Vec<LogEntry> {
        let state = self.lock();
        // Entries are contiguous by seq, so the start index can be computed directly.
        let first = state.entries.front().map_or(state.next_seq, |e| e.seq);
        let skip = usize::try_from(from.saturating_sub(first)).unwrap_or(usize::MAX);
        state.entries.iter().skip(skip).cloned().collect()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sequence number the next appended entry will receive.
    pub fn next_seq(&self) -> u64 {
        self.lock().next_seq
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSink")
            .field("len", &self.len())
            .field("max_entries", &self.max_entries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn peer() -> SocketAddr {
        "10.0.0.5:4000".parse().unwrap()
    }

    #[test]
    fn test_append_assigns_increasing_seq() {
        let sink = LogSink::new();
        let a = sink.status("one");
        let b = sink.message(peer(), "two");
        let c = sink.error(peer(), "Error: boom");

        assert_eq!((a.seq, b.seq, c.seq), (0, 1, 2));
        let texts: Vec<_> = sink.snapshot().into_iter().map(|e| e.text).collect();
        assert_eq!(texts, ["one", "10.0.0.5:4000: two", "10.0.0.5:4000: Error: boom"]);
    }

    #[test]
    fn test_since_returns_tail() {
        let sink = LogSink::new();
        for i in 0..5 {
            sink.status(format!("line {i}"));
        }
        let tail = sink.since(3);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].body, "line 3");
        assert!(sink.since(10).is_empty());
    }

    #[test]
    fn test_retention_evicts_oldest_and_keeps_seq() {
        let sink = LogSink::with_retention(3);
        for i in 0..5 {
            sink.status(format!("line {i}"));
        }
        let entries = sink.snapshot();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].seq, 2);
        assert_eq!(entries[2].seq, 4);
        assert_eq!(sink.next_seq(), 5);

        // Asking for evicted entries yields whatever is still retained.
        let tail = sink.since(0);
        assert_eq!(tail.first().map(|e| e.seq), Some(2));
        assert_eq!(sink.since(4).len(), 1);
    }

    #[test]
    fn test_zero_retention_keeps_newest() {
        let sink = LogSink::with_retention(0);
        sink.status("a");
        sink.status("b");
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.snapshot()[0].body, "b");
    }

    #[tokio::test]
    async fn test_subscribers_are_notified_in_order() {
        let sink = LogSink::new();
        let mut rx = sink.subscribe();
        sink.status("first");
        sink.message(peer(), "second");

        assert_eq!(rx.recv().await.unwrap().body, "first");
        assert_eq!(rx.recv().await.unwrap().body, "second");
    }

    #[test]
    fn test_concurrent_appends_are_all_stored() {
        let sink = Arc::new(LogSink::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        sink.status(format!("{t}-{i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let entries = sink.snapshot();
        assert_eq!(entries.len(), 800);
        assert!(entries.windows(2).all(|w| w[0].seq + 1 == w[1].seq));

        // Per-writer order is preserved.
        for t in 0..8 {
            let mine: Vec<_> = entries
                .iter()
                .filter(|e| e.body.starts_with(&format!("{t}-")))
                .map(|e| e.body.clone())
                .collect();
            let expected: Vec<_> = (0..100).map(|i| format!("{t}-{i}")).collect();
            assert_eq!(mine, expected);
        }
    }
}
