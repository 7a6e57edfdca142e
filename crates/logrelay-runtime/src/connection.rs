//! Per-connection handler.
//!
//! Turns one peer's byte stream into log entries. Every exit path (peer
//! close, read error, line limit, shutdown) ends with exactly one
//! "Closed connection" entry and the stream being shut down and dropped.

use std::net::SocketAddr;
use std::sync::Arc;

use logrelay_core::{
    ConnectionLimits, LineSplitter, LogSink, RelayError, connection_closed_text,
    connection_opened_text, error_text,
};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Read buffer size. Any chunk size works; lines are reassembled by the splitter.
const READ_CHUNK: usize = 1024;

/// Why a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The peer closed its write half.
    PeerClosed,
    /// The relay is shutting down.
    Shutdown,
    /// A read error or limit violation; an error entry was recorded.
    Failed,
}

/// Handle one accepted connection until it ends.
///
/// Unterminated bytes pending at close are discarded, never emitted.
pub async fn handle_connection<S>(
    mut stream: S,
    peer: SocketAddr,
    sink: Arc<LogSink>,
    limits: ConnectionLimits,
    cancel: CancellationToken,
) -> CloseReason
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    sink.peer_status(peer, connection_opened_text(peer));
    debug!(peer = %peer, "connection opened");

    let mut splitter = LineSplitter::with_limit(limits.max_line_bytes);
    let reason = match read_lines(&mut stream, peer, &sink, &mut splitter, &cancel).await {
        Ok(reason) => reason,
        Err(e) => {
            debug!(peer = %peer, error = %e, "connection failed");
            sink.error(peer, error_text(&e));
            CloseReason::Failed
        }
    };

    let discarded = splitter.discard();
    if discarded > 0 {
        debug!(peer = %peer, bytes = discarded, "discarded unterminated input");
    }

    sink.peer_status(peer, connection_closed_text(peer));
    // The peer may already be gone; a failed shutdown changes nothing for the log.
    if let Err(e) = stream.shutdown().await {
        debug!(peer = %peer, error = %e, "stream shutdown failed");
    }
    drop(stream);

    debug!(peer = %peer, ?reason, "connection closed");
    reason
}

async fn read_lines<S>(
    stream: &mut S,
    peer: SocketAddr,
    sink: &LogSink,
    splitter: &mut LineSplitter,
    cancel: &CancellationToken,
) -> Result<CloseReason, RelayError>
where
    S: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let n = tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(CloseReason::Shutdown),
            read = stream.read(&mut buf) => {
                read.map_err(|source| RelayError::Connection { peer, source })?
            }
        };
        if n == 0 {
            return Ok(CloseReason::PeerClosed);
        }

        let (lines, overflow) = splitter.push(&buf[..n]);
        for line in lines {
            sink.message(peer, line);
        }
        if let Some(err) = overflow {
            return Err(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logrelay_core::{EntryKind, LogEntry};
    use std::io;
    use tokio_test::io::Builder;

    fn peer() -> SocketAddr {
        "192.168.1.20:61000".parse().unwrap()
    }

    async fn run(mock: tokio_test::io::Mock, limits: ConnectionLimits) -> (CloseReason, Vec<LogEntry>) {
        let sink = Arc::new(LogSink::new());
        let reason =
            handle_connection(mock, peer(), Arc::clone(&sink), limits, CancellationToken::new())
                .await;
        (reason, sink.snapshot())
    }

    fn texts(entries: &[LogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.text.as_str()).collect()
    }

    #[tokio::test]
    async fn test_lines_across_chunks() {
        let mock = Builder::new()
            .read(b"hel")
            .read(b"lo\nwor")
            .read(b"ld\r\n")
            .build();
        let (reason, entries) = run(mock, ConnectionLimits::default()).await;

        assert_eq!(reason, CloseReason::PeerClosed);
        assert_eq!(
            texts(&entries),
            [
                "Connection from 192.168.1.20:61000",
                "192.168.1.20:61000: hello",
                "192.168.1.20:61000: world",
                "Closed connection from 192.168.1.20:61000",
            ]
        );
    }

    #[tokio::test]
    async fn test_unterminated_tail_is_discarded() {
        let mock = Builder::new().read(b"a\nb\nc").build();
        let (_, entries) = run(mock, ConnectionLimits::default()).await;

        let bodies: Vec<_> = entries
            .iter()
            .filter(|e| e.kind == EntryKind::Message)
            .map(|e| e.body.as_str())
            .collect();
        assert_eq!(bodies, ["a", "b"]);
        assert!(!entries.iter().any(|e| e.body.contains('c')));
    }

    #[tokio::test]
    async fn test_empty_line_is_tagged() {
        let mock = Builder::new().read(b"\n").build();
        let (_, entries) = run(mock, ConnectionLimits::default()).await;

        let message = &entries[1];
        assert_eq!(message.kind, EntryKind::Message);
        assert_eq!(message.body, "");
        assert_eq!(message.peer, Some(peer()));
    }

    #[tokio::test]
    async fn test_read_error_is_logged_and_closes() {
        let mock = Builder::new()
            .read(b"before\n")
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"))
            .build();
        let (reason, entries) = run(mock, ConnectionLimits::default()).await;

        assert_eq!(reason, CloseReason::Failed);
        assert_eq!(
            texts(&entries),
            [
                "Connection from 192.168.1.20:61000",
                "192.168.1.20:61000: before",
                "192.168.1.20:61000: Error: reset by peer",
                "Closed connection from 192.168.1.20:61000",
            ]
        );
        assert_eq!(entries[2].kind, EntryKind::Error);
    }

    #[tokio::test]
    async fn test_line_limit_emits_completed_lines_then_fails() {
        let limits = ConnectionLimits {
            max_line_bytes: Some(8),
        };
        let mock = Builder::new().read(b"short\nthis is far too long").build();
        let (reason, entries) = run(mock, limits).await;

        assert_eq!(reason, CloseReason::Failed);
        assert_eq!(entries[1].body, "short");
        assert_eq!(entries[2].body, "Error: line exceeds 8 bytes without a newline");
        assert_eq!(entries.len(), 4);
    }

    #[tokio::test]
    async fn test_cancellation_still_closes() {
        let (client, server) = tokio::io::duplex(64);
        let sink = Arc::new(LogSink::new());
        let cancel = CancellationToken::new();

        let task = tokio::spawn(handle_connection(
            server,
            peer(),
            Arc::clone(&sink),
            ConnectionLimits::default(),
            cancel.clone(),
        ));

        let mut client = client;
        client.write_all(b"one\npartial").await.unwrap();
        // Wait for the line to land before cancelling.
        let mut rx = sink.subscribe();
        while sink.len() < 2 {
            rx.recv().await.unwrap();
        }

        cancel.cancel();
        assert_eq!(task.await.unwrap(), CloseReason::Shutdown);

        let entries = sink.snapshot();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].body, "one");
        assert_eq!(entries[2].text, "Closed connection from 192.168.1.20:61000");
    }
}
