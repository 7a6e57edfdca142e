//! TCP listener and accept loop.
//!
//! Binds first and reports the real address, then accepts until cancelled.
//! Every accepted stream gets its own handler task; the loop never waits
//! on a handler, so a stalled peer cannot block new connections.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use logrelay_core::{ConnectionLimits, LogSink, RelayError, Settings, listening_text};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::connection::handle_connection;

/// Pause after a failed `accept()` (e.g. out of file descriptors).
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// A bound relay listener, ready to serve.
#[derive(Debug)]
pub struct RelayListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl RelayListener {
    /// Bind to `target` (`host:port`).
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Bind`] if the address cannot be acquired.
    pub async fn bind(target: &str) -> Result<Self, RelayError> {
        let bind_err = |source| RelayError::Bind {
            address: target.to_string(),
            source,
        };
        let listener = TcpListener::bind(target).await.map_err(bind_err)?;
        let local_addr = listener.local_addr().map_err(bind_err)?;
        debug!(addr = %local_addr, "relay bound");
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Bind, recording a failure in the sink as a single status entry.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Bind`] after logging it.
    pub async fn bind_or_report(target: &str, sink: &LogSink) -> Result<Self, RelayError> {
        match Self::bind(target).await {
            Ok(listener) => Ok(listener),
            Err(e) => {
                error!("{e}");
                let reason = match &e {
                    RelayError::Bind { source, .. } => source.to_string(),
                    other => other.to_string(),
                };
                sink.status(format!("Error starting server: {reason}"));
                Err(e)
            }
        }
    }

    /// Address actually bound (resolves port 0).
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept connections until `cancel` fires.
    ///
    /// On cancellation, stops accepting, cancels every handler and waits for
    /// all of them to record their close entry.
    pub async fn serve(self, sink: Arc<LogSink>, limits: ConnectionLimits, cancel: CancellationToken) {
        sink.status(listening_text(self.local_addr));
        info!(addr = %self.local_addr, "relay listening");

        let tracker = TaskTracker::new();
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!(peer = %peer, "accepted connection");
                        tracker.spawn(handle_connection(
                            stream,
                            peer,
                            Arc::clone(&sink),
                            limits,
                            cancel.child_token(),
                        ));
                    }
                    Err(e) => {
                        warn!(error = %e, "accept failed");
                        tokio::select! {
                            () = cancel.cancelled() => break,
                            () = tokio::time::sleep(ACCEPT_BACKOFF) => {}
                        }
                    }
                },
            }
        }

        drop(self.listener);
        tracker.close();
        debug!(active = tracker.len(), "waiting for connection handlers");
        tracker.wait().await;
        info!(addr = %self.local_addr, "relay stopped");
    }
}

/// Bind according to `settings` and serve until cancelled.
///
/// A bind failure is recorded in the sink and returned; it never panics.
///
/// # Errors
///
/// Returns [`RelayError::Bind`] if the listener cannot be bound.
pub async fn start_relay(
    settings: &Settings,
    sink: Arc<LogSink>,
    cancel: CancellationToken,
) -> Result<(), RelayError> {
    let listener = RelayListener::bind_or_report(&settings.bind_target(), &sink).await?;
    listener
        .serve(sink, settings.connection_limits(), cancel)
        .await;
    Ok(())
}
