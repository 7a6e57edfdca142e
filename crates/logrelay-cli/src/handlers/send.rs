//! Send command handler.
//!
//! One-shot delivery: every outcome is printed, none is returned as an
//! error, so the process exits normally either way.

use anyhow::Result;
use logrelay_core::SendError;
use logrelay_runtime::send_message;
use tracing::debug;

use crate::commands::SendArgs;

/// Execute the send command.
pub async fn execute(args: &SendArgs) -> Result<()> {
    let message = args.message_text();
    let outcome = send_message(&args.host, args.port, &message).await;
    if let Err(ref e) = outcome {
        debug!(host = %args.host, port = args.port, error = ?e, "send failed");
    }
    println!("{}", report(&outcome));
    Ok(())
}

/// Console line for a send outcome.
pub fn report(outcome: &Result<String, SendError>) -> String {
    match outcome {
        Ok(sent) => format!("Sent: {sent}"),
        Err(e) => format!("Error: {e}"),
    }
}
