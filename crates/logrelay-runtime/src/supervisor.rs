//! Relay supervisor for managing the listener lifecycle.
//!
//! The supervisor owns the running relay task. Frontends (terminal UI,
//! headless tail, tests) start and stop it without holding task handles.
//!
//! - **Bind-then-report**: the listener binds before the task spawns, so
//!   `start()` returns the real address (port 0 resolves here).
//! - **Crash detection**: `status()` uses the cancellation token to tell a
//!   clean stop from a task that ended on its own.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use logrelay_core::{LogSink, RelayError, Settings};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::listener::RelayListener;

/// How long `stop()` waits for handlers to finish before aborting.
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to a running relay.
struct RelayHandle {
    cancel_token: CancellationToken,
    join_handle: JoinHandle<()>,
    bound_addr: SocketAddr,
}

/// Status of the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayStatus {
    /// Relay is not running.
    Stopped,
    /// Relay is accepting connections.
    Running {
        /// Address the relay is listening on.
        address: SocketAddr,
    },
    /// Relay task ended without being cancelled.
    Crashed,
}

impl fmt::Display for RelayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "Stopped"),
            Self::Running { address } => write!(f, "Running on {address}"),
            Self::Crashed => write!(f, "Crashed"),
        }
    }
}

/// Error from supervisor operations.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    /// Relay is already running.
    #[error("Relay is already running on {0}")]
    AlreadyRunning(SocketAddr),

    /// Failed to bind.
    #[error(transparent)]
    Bind(#[from] RelayError),

    /// Relay is not running.
    #[error("Relay is not running")]
    NotRunning,

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Supervisor for a single relay instance.
///
/// ```ignore
/// let supervisor = RelaySupervisor::new();
/// let addr = supervisor.start(&settings, sink).await?;
/// println!("Status: {}", supervisor.status().await);
/// supervisor.stop().await?;
/// ```
pub struct RelaySupervisor {
    handle: Mutex<Option<RelayHandle>>,
}

impl Default for RelaySupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl RelaySupervisor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }

    /// Bind and start the relay.
    ///
    /// A bind failure is also recorded in `sink` as one status entry.
    ///
    /// # Errors
    ///
    /// Returns error if already running or if bind fails.
    pub async fn start(
        &self,
        settings: &Settings,
        sink: Arc<LogSink>,
    ) -> Result<SocketAddr, SupervisorError> {
        let mut guard = self.handle.lock().await;

        if let Some(old) = guard.take() {
            if !old.join_handle.is_finished() {
                let addr = old.bound_addr;
                *guard = Some(old);
                return Err(SupervisorError::AlreadyRunning(addr));
            }
            if let Err(e) = old.join_handle.await {
                warn!("Previous relay task panicked: {e}");
            }
        }

        let listener = RelayListener::bind_or_report(&settings.bind_target(), &sink).await?;
        let bound_addr = listener.local_addr();

        let cancel_token = CancellationToken::new();
        let cancel_clone = cancel_token.clone();
        let limits = settings.connection_limits();

        let join_handle = tokio::spawn(async move {
            debug!(addr = %bound_addr, "relay task starting");
            listener.serve(sink, limits, cancel_clone).await;
        });

        *guard = Some(RelayHandle {
            cancel_token,
            join_handle,
            bound_addr,
        });

        Ok(bound_addr)
    }

    /// Stop the relay, waiting for every connection to close.
    ///
    /// Aborts the task if it does not finish within 5 seconds.
    ///
    /// # Errors
    ///
    /// Returns error if not running or if the task panicked.
    pub async fn stop(&self) -> Result<(), SupervisorError> {
        let mut guard = self.handle.lock().await;
        let Some(handle) = guard.take() else {
            return Err(SupervisorError::NotRunning);
        };

        info!("Stopping relay on {}", handle.bound_addr);
        handle.cancel_token.cancel();

        let mut join = handle.join_handle;
        match tokio::time::timeout(STOP_TIMEOUT, &mut join).await {
            Ok(Ok(())) => {
                info!("Relay stopped cleanly");
                Ok(())
            }
            Ok(Err(e)) => Err(SupervisorError::Internal(format!(
                "Relay task panicked: {e}"
            ))),
            Err(_) => {
                warn!("Relay did not stop within {STOP_TIMEOUT:?}, aborting");
                join.abort();
                Ok(())
            }
        }
    }

    /// Current relay status.
    pub async fn status(&self) -> RelayStatus {
        let guard = self.handle.lock().await;
        match guard.as_ref() {
            None => RelayStatus::Stopped,
            Some(h) if !h.join_handle.is_finished() => RelayStatus::Running {
                address: h.bound_addr,
            },
            Some(h) if h.cancel_token.is_cancelled() => RelayStatus::Stopped,
            Some(_) => RelayStatus::Crashed,
        }
    }

    /// Address of the running relay, if any.
    pub async fn address(&self) -> Option<SocketAddr> {
        match self.status().await {
            RelayStatus::Running { address } => Some(address),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_settings() -> Settings {
        Settings {
            bind_address: Some("127.0.0.1".to_string()),
            port: Some(0),
            ..Settings::default()
        }
    }

    #[test]
    fn test_status_display() {
        assert_eq!(RelayStatus::Stopped.to_string(), "Stopped");
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        assert_eq!(
            RelayStatus::Running { address: addr }.to_string(),
            "Running on 127.0.0.1:9000"
        );
    }

    #[tokio::test]
    async fn test_start_stop_lifecycle() {
        let supervisor = RelaySupervisor::new();
        let sink = Arc::new(LogSink::new());

        assert_eq!(supervisor.status().await, RelayStatus::Stopped);
        let addr = supervisor
            .start(&local_settings(), Arc::clone(&sink))
            .await
            .unwrap();
        assert_eq!(supervisor.address().await, Some(addr));

        let second = supervisor.start(&local_settings(), Arc::clone(&sink)).await;
        assert!(matches!(second, Err(SupervisorError::AlreadyRunning(a)) if a == addr));

        supervisor.stop().await.unwrap();
        assert_eq!(supervisor.status().await, RelayStatus::Stopped);
        assert!(matches!(
            supervisor.stop().await,
            Err(SupervisorError::NotRunning)
        ));
    }

    #[tokio::test]
    async fn test_bind_failure_leaves_supervisor_stopped() {
        let supervisor = RelaySupervisor::new();
        let sink = Arc::new(LogSink::new());
        let addr = supervisor
            .start(&local_settings(), Arc::clone(&sink))
            .await
            .unwrap();

        let other = RelaySupervisor::new();
        let conflicting = Settings {
            bind_address: Some("127.0.0.1".to_string()),
            port: Some(addr.port()),
            ..Settings::default()
        };
        let result = other.start(&conflicting, Arc::clone(&sink)).await;
        assert!(matches!(result, Err(SupervisorError::Bind(_))));
        assert_eq!(other.status().await, RelayStatus::Stopped);
        assert!(
            sink.snapshot()
                .iter()
                .any(|e| e.text.starts_with("Error starting server: "))
        );

        supervisor.stop().await.unwrap();
    }
}
