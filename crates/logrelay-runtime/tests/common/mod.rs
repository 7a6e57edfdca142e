//! Shared helpers for relay integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use logrelay_core::{LogEntry, LogSink, Settings};
use logrelay_runtime::RelaySupervisor;

/// Upper bound on how long a test waits for entries to arrive.
pub const WAIT: Duration = Duration::from_secs(5);

/// A relay running on an ephemeral loopback port.
pub struct TestRelay {
    pub supervisor: RelaySupervisor,
    pub sink: Arc<LogSink>,
    pub addr: SocketAddr,
}

impl TestRelay {
    pub async fn start() -> Self {
        Self::start_with(Settings::default()).await
    }

    pub async fn start_with(settings: Settings) -> Self {
        let settings = Settings {
            bind_address: Some("127.0.0.1".to_string()),
            port: Some(0),
            ..settings
        };
        let sink = Arc::new(LogSink::new());
        let supervisor = RelaySupervisor::new();
        let addr = supervisor
            .start(&settings, Arc::clone(&sink))
            .await
            .expect("relay should bind to an ephemeral port");
        Self {
            supervisor,
            sink,
            addr,
        }
    }

    /// Wait until `pred` holds for the sink's entries, or panic after [`WAIT`].
    pub async fn wait_for<F>(&self, pred: F) -> Vec<LogEntry>
    where
        F: Fn(&[LogEntry]) -> bool,
    {
        let mut rx = self.sink.subscribe();
        let deadline = tokio::time::Instant::now() + WAIT;
        loop {
            let entries = self.sink.snapshot();
            if pred(&entries) {
                return entries;
            }
            match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(_) => {}
                Err(_) => panic!("timed out waiting for entries; have: {entries:#?}"),
            }
        }
    }

    /// Wait until `peer` has its close entry.
    pub async fn wait_closed(&self, peer: SocketAddr) -> Vec<LogEntry> {
        let closed = format!("Closed connection from {peer}");
        self.wait_for(|entries| entries.iter().any(|e| e.text == closed))
            .await
    }
}

/// Message bodies attributed to `peer`, in display order.
pub fn messages_from(entries: &[LogEntry], peer: SocketAddr) -> Vec<String> {
    entries
        .iter()
        .filter(|e| e.kind == logrelay_core::EntryKind::Message && e.peer == Some(peer))
        .map(|e| e.body.clone())
        .collect()
}
