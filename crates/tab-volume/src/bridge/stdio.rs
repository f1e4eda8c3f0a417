use crate::{
    AppResult,
    bridge::{BridgeEvent, BridgeOutput},
};

use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    sync::mpsc,
};
use tracing::{debug, info, warn};

/// Parse one event per line until EOF or until the receiver goes away.
///
/// Blank lines are skipped; lines that do not parse are logged and skipped.
pub(crate) async fn read_events<R>(reader: R, events: mpsc::Sender<BridgeEvent>) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event = match serde_json::from_str::<BridgeEvent>(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, line, "Ignoring malformed bridge event");
                continue;
            }
        };

        if events.send(event).await.is_err() {
            debug!("Event receiver closed");
            return Ok(());
        }
    }

    info!("Browser bridge input closed");

    Ok(())
}

/// Write one JSON line per output, flushing after each, until every sender
/// is gone.
pub(crate) async fn write_output<W>(
    mut writer: W,
    mut outputs: mpsc::UnboundedReceiver<BridgeOutput>,
) -> AppResult<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(output) = outputs.recv().await {
        let mut line = match serde_json::to_vec(&output) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, ?output, "Failed to encode bridge output");
                continue;
            }
        };
        line.push(b'\n');

        writer.write_all(&line).await?;
        writer.flush().await?;
    }

    Ok(())
}
