//! One-shot line sender.
//!
//! Connects, writes one newline-terminated message, closes. No retry.

use logrelay_core::SendError;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::debug;

/// Send `message` to the relay at `host:port`.
///
/// A trailing `\n` is appended if absent. Returns the message with
/// surrounding whitespace trimmed, for confirmation output.
///
/// # Errors
///
/// Returns [`SendError::ConnectionRefused`] when nothing listens at
/// `host:port`, or [`SendError::Io`] for any other socket failure.
pub async fn send_message(host: &str, port: u16, message: &str) -> Result<String, SendError> {
    let mut stream = TcpStream::connect((host, port))
        .await
        .map_err(|e| SendError::from_connect(e, host, port))?;

    let payload = terminated(message);
    stream.write_all(payload.as_bytes()).await?;
    stream.shutdown().await?;
    debug!(host, port, bytes = payload.len(), "message sent");

    Ok(payload.trim().to_string())
}

fn terminated(message: &str) -> String {
    let mut payload = message.to_string();
    if !payload.ends_with('\n') {
        payload.push('\n');
    }
    payload
}
