//! Tail command handler.
//!
//! Headless relay: prints each entry to stdout as it is appended, until
//! Ctrl-C.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use logrelay_core::{LogEntry, LogFollower, validate_settings};
use logrelay_runtime::RelaySupervisor;
use tracing::info;

use crate::commands::TailArgs;
use crate::error::CliError;
use crate::handlers::build_sink;

/// Output format for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailFormat {
    Plain,
    Timestamped,
    Json,
}

impl TailFormat {
    pub const fn from_args(args: &TailArgs) -> Self {
        if args.json {
            Self::Json
        } else if args.timestamps {
            Self::Timestamped
        } else {
            Self::Plain
        }
    }
}

/// Render one entry as a single output line.
pub fn format_entry(entry: &LogEntry, format: TailFormat) -> Result<String> {
    Ok(match format {
        TailFormat::Plain => entry.text.clone(),
        TailFormat::Timestamped => format!(
            "[{}] {}",
            entry.received_at.format("%H:%M:%S%.3f"),
            entry.text
        ),
        TailFormat::Json => serde_json::to_string(entry)?,
    })
}

/// Execute the tail command.
pub async fn execute(args: &TailArgs) -> Result<()> {
    let settings = args.relay.to_settings();
    validate_settings(&settings).map_err(CliError::from)?;
    let format = TailFormat::from_args(args);

    let sink = build_sink(&settings);
    let mut follower = LogFollower::from_start(Arc::clone(&sink));

    let supervisor = RelaySupervisor::new();
    let started = supervisor.start(&settings, Arc::clone(&sink)).await;

    let mut stdout = io::stdout();
    if let Err(e) = started {
        // The sink already holds the "Error starting server" line.
        for entry in follower.try_batch() {
            writeln!(stdout, "{}", format_entry(&entry, format)?)?;
        }
        return Err(CliError::Relay(e.to_string()).into());
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            batch = follower.next_batch() => {
                let Some(entries) = batch else { break };
                for entry in entries {
                    writeln!(stdout, "{}", format_entry(&entry, format)?)?;
                }
                stdout.flush()?;
            }
            _ = &mut ctrl_c => {
                info!("interrupt received, shutting down");
                break;
            }
        }
    }

    supervisor.stop().await?;
    // Flush the close entries recorded during shutdown.
    for entry in follower.try_batch() {
        writeln!(stdout, "{}", format_entry(&entry, format)?)?;
    }
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use logrelay_core::LogSink;

    fn sample() -> LogEntry {
        let sink = LogSink::new();
        sink.message("127.0.0.1:40000".parse().unwrap(), "disk at 91%")
    }

    #[test]
    fn test_plain_format() {
        let line = format_entry(&sample(), TailFormat::Plain).unwrap();
        assert_eq!(line, "127.0.0.1:40000: disk at 91%");
    }

    #[test]
    fn test_timestamped_format() {
        let line = format_entry(&sample(), TailFormat::Timestamped).unwrap();
        assert!(line.starts_with('['));
        assert!(line.ends_with("] 127.0.0.1:40000: disk at 91%"));
    }

    #[test]
    fn test_json_format_is_one_line() {
        let line = format_entry(&sample(), TailFormat::Json).unwrap();
        assert!(!line.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["kind"], "message");
        assert_eq!(value["body"], "disk at 91%");
        assert_eq!(value["peer"], "127.0.0.1:40000");
    }
}
