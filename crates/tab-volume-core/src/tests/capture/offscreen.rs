use crate::{
    SessionKey, TabId,
    capture::{CaptureBackend, CaptureReply, CaptureRequest, MediaDevices, OffscreenBackend},
    tests::support::{FakeMedia, volume},
};

use std::sync::{Arc, atomic::Ordering};

use serde_json::json;

fn backend() -> (OffscreenBackend, Arc<FakeMedia>) {
    let media = FakeMedia::new();
    (
        OffscreenBackend::new(Arc::clone(&media) as Arc<dyn MediaDevices>),
        media,
    )
}

fn request(stream_id: &str, tab: i64, percent: u8) -> CaptureRequest {
    CaptureRequest {
        stream_id: SessionKey::new(stream_id),
        tab: TabId(tab),
        volume: volume(percent),
    }
}

/// WHAT: The capture context starts on first request, once
/// WHY: The context is costly and only needed once audio is touched
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_idle_backend_when_requesting_volume_then_context_started_once() {
    // Given
    let (backend, _media) = backend();
    assert!(!backend.is_running().await);

    // When
    backend.set_volume(request("s1", 1, 50)).await.unwrap();
    backend.set_volume(request("s2", 2, 80)).await.unwrap();

    // Then
    assert!(backend.is_running().await);
    assert_eq!(backend.activations(), 1);
}

/// WHAT: A successful request applies the squared gain
/// WHY: The graph consumes gain, not the percentage
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_request_when_applying_then_ok_and_squared_gain() {
    // Given
    let (backend, media) = backend();

    // When
    let reply = backend.set_volume(request("s1", 7, 50)).await.unwrap();

    // Then
    assert_eq!(reply, CaptureReply { ok: true });
    assert_eq!(media.last_probe().gain_value(), Some(0.25));
}

/// WHAT: Graph failures reply ok false instead of erroring
/// WHY: The coordinator distinguishes a refused request from a dead context
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_media_failure_when_applying_then_ok_false() {
    // Given
    let (backend, media) = backend();
    media.fail_open.store(true, Ordering::SeqCst);

    // When
    let reply = backend.set_volume(request("s1", 7, 50)).await.unwrap();

    // Then
    assert_eq!(reply, CaptureReply { ok: false });
}

/// WHAT: Teardown closes the session's graph
/// WHY: A discarded session must stop capturing
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_running_graph_when_tearing_down_then_track_stopped() {
    // Given
    let (backend, media) = backend();
    backend.set_volume(request("s1", 7, 50)).await.unwrap();

    // When
    backend.teardown(&SessionKey::new("s1")).await.unwrap();

    // Then
    assert!(media.last_probe().is_stopped());
}

/// WHAT: Teardown without a running context is a no-op
/// WHY: Tab closure must not start the capture context
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_idle_backend_when_tearing_down_then_context_not_started() {
    // Given
    let (backend, _media) = backend();

    // When
    backend.teardown(&SessionKey::new("s1")).await.unwrap();
    backend.teardown_all().await.unwrap();

    // Then
    assert_eq!(backend.activations(), 0);
}

/// WHAT: Requests serialize with the cross-context wire shape
/// WHY: The capture context matches on `type` and camelCase fields
#[test]
#[allow(clippy::unwrap_used)]
fn given_request_when_serializing_then_setvol_shape() {
    // When
    let value = serde_json::to_value(request("abc", 7, 50)).unwrap();

    // Then
    assert_eq!(
        value,
        json!({ "type": "setvol", "streamId": "abc", "tab": 7, "volume": 50 })
    );
}
