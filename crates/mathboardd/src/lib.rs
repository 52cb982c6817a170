//! # mathboardd
//!
//! A line-delimited JSON relay between an explanation generator and a math
//! display. Requests arrive as `request_math` events carrying generation steps;
//! each step is normalized by `mathboard-core` and sent back as a
//! `display_step` event, paced by a configurable delay.
//!
//! ## Sessions
//!
//! A session runs one request at a time. A new `request_math` for a busy
//! session supersedes the running one, which stops at its next step boundary and
//! reports `request_superseded`. A `disconnect` stops the running request
//! without further output. Session state is created when a request starts and
//! dropped when it completes, is superseded or the session disconnects.

pub mod config;
pub mod protocol;
pub mod relay;

pub use config::RelayConfig;
pub use protocol::{Inbound, Outbound};
pub use relay::Relay;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

/// Serves the relay protocol until `input` reaches end of file.
///
/// Requests still running at end of input are allowed to finish before this
/// returns.
pub async fn serve<R, W>(config: RelayConfig, input: R, output: W) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_lines(rx, output));
    let relay = Relay::new(config, tx.clone());

    let mut emitters = Vec::new();
    let mut lines = BufReader::new(input).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Inbound>(line) {
            Ok(message) => {
                if let Some(handle) = relay.handle(message) {
                    emitters.push(handle);
                }
            }
            Err(e) => {
                log::warn!("rejected message: {}", e);
                let _ = tx.send(Outbound::error(None, format!("invalid message: {}", e)));
            }
        }
        emitters.retain(|handle| !handle.is_finished());
    }

    log::info!("input closed; waiting for {} request(s)", emitters.len());
    for handle in emitters {
        handle.await?;
    }

    drop(relay);
    drop(tx);
    writer.await?
}

async fn write_lines<W>(mut rx: mpsc::UnboundedReceiver<Outbound>, mut output: W) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = rx.recv().await {
        let mut line = serde_json::to_string(&message)?;
        line.push('\n');
        output.write_all(line.as_bytes()).await?;
        output.flush().await?;
    }
    Ok(())
}
