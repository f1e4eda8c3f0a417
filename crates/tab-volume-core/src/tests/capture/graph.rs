use crate::{
    SessionKey, VolumeError,
    capture::{GainNode, GraphRegistry, MediaDevices},
    tests::support::FakeMedia,
};

use std::sync::{Arc, atomic::Ordering};

fn graphs() -> (GraphRegistry, Arc<FakeMedia>) {
    let media = FakeMedia::new();
    (
        GraphRegistry::new(Arc::clone(&media) as Arc<dyn MediaDevices>),
        media,
    )
}

/// WHAT: Clones share one gain value and subscribers see updates
/// WHY: The graph owner and the renderer hold separate handles
#[test]
fn given_cloned_gain_node_when_setting_then_all_handles_observe() {
    // Given
    let gain = GainNode::new(1.0);
    let renderer = gain.clone();
    let mut changes = gain.subscribe();

    // When
    gain.set(0.36);

    // Then
    assert_eq!(renderer.value(), 0.36);
    assert!(changes.has_changed().unwrap_or(false));
    assert_eq!(*changes.borrow_and_update(), 0.36);
}

/// WHAT: First gain for a session opens one track; later gains update it
/// WHY: A session never holds more than one graph
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_existing_graph_when_setting_gain_then_updated_in_place() {
    // Given
    let (mut graphs, media) = graphs();
    let key = SessionKey::new("stream-a");
    graphs.set_gain(&key, 0.25).await.unwrap();

    // When
    graphs.set_gain(&key, 0.81).await.unwrap();

    // Then
    assert_eq!(media.opened(), 1);
    assert_eq!(graphs.len(), 1);
    assert_eq!(graphs.get(&key).unwrap().gain().value(), 0.81);
    assert_eq!(media.last_probe().gain_value(), Some(0.81));
}

/// WHAT: A failed open registers nothing
/// WHY: The next request must retry from scratch
#[tokio::test]
async fn given_open_failure_when_setting_gain_then_no_graph() {
    // Given
    let (mut graphs, media) = graphs();
    media.fail_open.store(true, Ordering::SeqCst);

    // When
    let result = graphs.set_gain(&SessionKey::new("stream-b"), 0.5).await;

    // Then
    assert!(matches!(result, Err(VolumeError::BackendFailed { .. })));
    assert!(graphs.is_empty());
}

/// WHAT: A failed connect stops the opened track
/// WHY: A half-built graph must not keep capturing
#[tokio::test]
async fn given_connect_failure_when_setting_gain_then_track_stopped() {
    // Given
    let (mut graphs, media) = graphs();
    media.fail_connect.store(true, Ordering::SeqCst);

    // When
    let result = graphs.set_gain(&SessionKey::new("stream-c"), 0.5).await;

    // Then
    assert!(result.is_err());
    assert!(graphs.is_empty());
    assert!(media.last_probe().is_stopped());
}

/// WHAT: Teardown stops the track and reports whether a graph existed
/// WHY: Closed tabs must release their capture
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_graph_when_tearing_down_then_track_stopped() {
    // Given
    let (mut graphs, media) = graphs();
    let key = SessionKey::new("stream-d");
    graphs.set_gain(&key, 1.0).await.unwrap();

    // When
    let removed = graphs.teardown(&key);
    let removed_again = graphs.teardown(&key);

    // Then
    assert!(removed);
    assert!(!removed_again);
    assert!(media.last_probe().is_stopped());
}

/// WHAT: Teardown-all stops every track
/// WHY: Unload must leave no capture running
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_several_graphs_when_tearing_down_all_then_every_track_stopped() {
    // Given
    let (mut graphs, media) = graphs();
    for name in ["one", "two", "three"] {
        graphs.set_gain(&SessionKey::new(name), 0.5).await.unwrap();
    }

    // When
    graphs.teardown_all();

    // Then
    assert!(graphs.is_empty());
    assert!(media.probes().iter().all(|(_, probe)| probe.is_stopped()));
}
