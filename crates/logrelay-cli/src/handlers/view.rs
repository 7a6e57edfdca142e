//! View command handler.
//!
//! Starts the relay and hands the terminal to the log viewer. A bind
//! failure shows up as a line in the log; the viewer stays usable.

use std::sync::Arc;

use anyhow::Result;
use logrelay_core::{LogSink, Settings, validate_settings};
use logrelay_runtime::{RelayStatus, RelaySupervisor};
use tracing::{info, warn};

use crate::commands::ViewArgs;
use crate::error::CliError;
use crate::handlers::build_sink;
use crate::tui;

/// Everything the viewer needs once the relay has been started (or failed to).
pub(crate) struct Startup {
    pub sink: Arc<LogSink>,
    pub supervisor: RelaySupervisor,
    pub title: String,
}

/// Log the initialization line, then try to start the relay.
///
/// The sink always begins with "Initializing server..." followed by either
/// the listener's status or a single "Error starting server: ..." line.
pub(crate) async fn start(settings: &Settings) -> Startup {
    let sink = build_sink(settings);
    sink.status("Initializing server...");

    let supervisor = RelaySupervisor::new();
    let status = match supervisor.start(settings, Arc::clone(&sink)).await {
        Ok(address) => RelayStatus::Running { address },
        Err(e) => {
            warn!("relay not started: {e}");
            RelayStatus::Stopped
        }
    };

    Startup {
        sink,
        supervisor,
        title: format!("logrelay | {status}"),
    }
}

/// Execute the view command.
pub async fn execute(args: &ViewArgs) -> Result<()> {
    let settings = args.relay.to_settings();
    validate_settings(&settings).map_err(CliError::from)?;

    let Startup {
        sink,
        supervisor,
        title,
    } = start(&settings).await;

    let ui_result = tui::run(Arc::clone(&sink), title, settings.max_entries).await;

    if supervisor.address().await.is_some() {
        supervisor.stop().await?;
    }
    info!(entries = sink.next_seq(), "viewer closed");

    ui_result.map_err(|e| CliError::from(e).into())
}
