//! Native messaging frame codec.
//!
//! Each message is a 32-bit length in native byte order followed by that
//! many bytes of UTF-8 JSON.

use crate::{CoreResult, VolumeError};

use std::{io::ErrorKind, panic::Location};

use error_location::ErrorLocation;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest message accepted from the host.
pub const MAX_INBOUND_FRAME: usize = 1024 * 1024;

/// Read one message. Returns `None` when the stream ends between frames.
///
/// # Errors
///
/// Returns [`VolumeError::Transport`] on I/O failure or truncation and
/// [`VolumeError::Protocol`] for oversized frames or invalid JSON.
pub async fn read_frame<R>(reader: &mut R) -> CoreResult<Option<Value>>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; 4];
    match reader.read_exact(&mut prefix).await {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => {
            return Err(VolumeError::Transport {
                reason: format!("Failed to read frame length: {}", e),
                location: ErrorLocation::from(Location::caller()),
            });
        }
    }

    let len = u32::from_ne_bytes(prefix) as usize;
    if len > MAX_INBOUND_FRAME {
        return Err(VolumeError::Protocol {
            reason: format!(
                "Frame of {} bytes exceeds {} byte limit",
                len, MAX_INBOUND_FRAME
            ),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let mut body = vec![0u8; len];
    reader
        .read_exact(&mut body)
        .await
        .map_err(|e| VolumeError::Transport {
            reason: format!("Failed to read {} byte frame: {}", len, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let value = serde_json::from_slice(&body).map_err(|e| VolumeError::Protocol {
        reason: format!("Frame is not valid JSON: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok(Some(value))
}

/// Write one message and flush.
///
/// # Errors
///
/// Returns [`VolumeError::Transport`] on I/O failure and
/// [`VolumeError::Protocol`] if the message cannot be framed.
pub async fn write_frame<W>(writer: &mut W, message: &Value) -> CoreResult<()>
where
    W: AsyncWrite + Unpin,
{
    let body = serde_json::to_vec(message).map_err(|e| VolumeError::Protocol {
        reason: format!("Failed to encode message: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let len = u32::try_from(body.len()).map_err(|_| VolumeError::Protocol {
        reason: format!("Message of {} bytes is too large to frame", body.len()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let transport_error = |e: std::io::Error| VolumeError::Transport {
        reason: format!("Failed to write frame: {}", e),
        location: ErrorLocation::from(Location::caller()),
    };

    writer
        .write_all(&len.to_ne_bytes())
        .await
        .map_err(transport_error)?;
    writer.write_all(&body).await.map_err(transport_error)?;
    writer.flush().await.map_err(transport_error)?;

    Ok(())
}
