use crate::{
    VolumeError,
    host::framing::{MAX_INBOUND_FRAME, read_frame, write_frame},
};

use serde_json::json;
use tokio::io::AsyncWriteExt;

/// WHAT: A written frame reads back as the same message
/// WHY: Both directions of the native link share this codec
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_written_frames_when_reading_then_messages_in_order() {
    // Given: Two frames written into a pipe
    let (mut writer, mut reader) = tokio::io::duplex(1024);
    write_frame(&mut writer, &json!({ "message": "ping" }))
        .await
        .unwrap();
    write_frame(&mut writer, &json!({ "type": "allready" }))
        .await
        .unwrap();
    drop(writer);

    // When: Reading until end of stream
    let first = read_frame(&mut reader).await.unwrap();
    let second = read_frame(&mut reader).await.unwrap();
    let end = read_frame(&mut reader).await.unwrap();

    // Then: Both messages in order, then a clean end
    assert_eq!(first, Some(json!({ "message": "ping" })));
    assert_eq!(second, Some(json!({ "type": "allready" })));
    assert_eq!(end, None);
}

/// WHAT: Length prefix is four native-endian bytes
/// WHY: Native messaging hosts decode the prefix in native byte order
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_message_when_writing_then_native_endian_prefix() {
    // Given
    let mut buffer = Vec::new();

    // When
    write_frame(&mut buffer, &json!({ "a": 1 })).await.unwrap();

    // Then
    let body = br#"{"a":1}"#;
    assert_eq!(&buffer[..4], &(body.len() as u32).to_ne_bytes());
    assert_eq!(&buffer[4..], body);
}

/// WHAT: Oversized frames are rejected before allocating
/// WHY: A corrupt prefix must not allocate gigabytes
#[tokio::test]
async fn given_oversized_prefix_when_reading_then_protocol_error() {
    // Given: A prefix one byte over the limit
    let len = (MAX_INBOUND_FRAME as u32) + 1;
    let bytes = len.to_ne_bytes().to_vec();

    // When
    let result = read_frame(&mut bytes.as_slice()).await;

    // Then
    assert!(matches!(result, Err(VolumeError::Protocol { .. })));
}

/// WHAT: A frame cut off mid-body is a transport error
/// WHY: Truncation means the host died mid-write
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_truncated_body_when_reading_then_transport_error() {
    // Given: A prefix promising 10 bytes followed by 3
    let (mut writer, mut reader) = tokio::io::duplex(64);
    writer.write_all(&10u32.to_ne_bytes()).await.unwrap();
    writer.write_all(b"{\"a").await.unwrap();
    drop(writer);

    // When
    let result = read_frame(&mut reader).await;

    // Then
    assert!(matches!(result, Err(VolumeError::Transport { .. })));
}

/// WHAT: Non-JSON bodies are protocol errors
/// WHY: Garbage from the host must not be mistaken for a message
#[tokio::test]
async fn given_invalid_json_body_when_reading_then_protocol_error() {
    // Given
    let body = b"not json";
    let mut bytes = (body.len() as u32).to_ne_bytes().to_vec();
    bytes.extend_from_slice(body);

    // When
    let result = read_frame(&mut bytes.as_slice()).await;

    // Then
    assert!(matches!(result, Err(VolumeError::Protocol { .. })));
}
