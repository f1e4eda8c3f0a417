use tab_volume_core::{
    CoreResult, VolumeError,
    host::{HostPort, NativeTransport, PortPeer, framing},
};

use std::{panic::Location, path::PathBuf, process::Stdio};

use async_trait::async_trait;
use error_location::ErrorLocation;
use serde_json::Value;
use tokio::{
    process::{Child, ChildStdin, ChildStdout, Command},
    sync::mpsc,
};
use tracing::{debug, info, instrument, warn};

/// [`NativeTransport`] that spawns the host executable and speaks native
/// messaging frames over its stdin and stdout.
///
/// The child is killed once the connector drops its end of the port.
pub struct ProcessTransport {
    command: Option<PathBuf>,
    args: Vec<String>,
}

impl ProcessTransport {
    /// Transport for `command` with extra `args`. `None` never connects.
    pub fn new(command: Option<PathBuf>, args: Vec<String>) -> Self {
        Self { command, args }
    }

    #[track_caller]
    fn transport_error(reason: String) -> VolumeError {
        VolumeError::Transport {
            reason,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

#[async_trait]
impl NativeTransport for ProcessTransport {
    #[instrument(skip(self))]
    async fn connect(&self, host_name: &str) -> CoreResult<HostPort> {
        let Some(command) = &self.command else {
            return Err(Self::transport_error(format!(
                "No executable configured for native host {}",
                host_name
            )));
        };

        let mut child = Command::new(command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Self::transport_error(format!("Failed to start {}: {}", command.display(), e))
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(Self::transport_error(
                "Native host stdio was not captured".to_string(),
            ));
        };

        info!(pid = ?child.id(), command = ?command, "Native host started");

        let (port, PortPeer { outbound, inbound }) = HostPort::pair();
        tokio::spawn(pump_inbound(stdout, inbound));
        tokio::spawn(pump_outbound(child, stdin, outbound));

        Ok(port)
    }
}

/// Host stdout → connector. Ends (and so signals a disconnect) on EOF or a
/// bad frame.
async fn pump_inbound(mut stdout: ChildStdout, inbound: mpsc::Sender<Value>) {
    loop {
        match framing::read_frame(&mut stdout).await {
            Ok(Some(message)) => {
                if inbound.send(message).await.is_err() {
                    debug!("Connector dropped the port");
                    return;
                }
            }
            Ok(None) => {
                info!("Native host closed its output");
                return;
            }
            Err(e) => {
                warn!(error = ?e, "Failed to read from native host");
                return;
            }
        }
    }
}

/// Connector → host stdin. Owns the child so it dies with the port.
async fn pump_outbound(
    mut child: Child,
    mut stdin: ChildStdin,
    mut outbound: mpsc::Receiver<Value>,
) {
    while let Some(message) = outbound.recv().await {
        if let Err(e) = framing::write_frame(&mut stdin, &message).await {
            warn!(error = ?e, "Failed to write to native host");
            break;
        }
    }

    drop(stdin);
    match child.kill().await {
        Ok(()) => debug!("Native host stopped"),
        Err(e) => debug!(error = ?e, "Native host already exited"),
    }
}
