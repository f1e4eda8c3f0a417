use crate::host::{Backoff, ConnectionState, DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_BACKOFF};

use std::time::Duration;

/// WHAT: Delays double from the initial value
/// WHY: Repeated failures must space reconnects out exponentially
#[test]
fn given_default_backoff_when_taking_delays_then_doubling_sequence() {
    // Given
    let mut backoff = Backoff::new(DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_BACKOFF);

    // When
    let delays: Vec<u128> = (0..4).map(|_| backoff.next_delay().as_millis()).collect();

    // Then
    assert_eq!(delays, vec![1000, 2000, 4000, 8000]);
}

/// WHAT: Delays saturate at the maximum
/// WHY: A long outage must not push reconnects out indefinitely
#[test]
fn given_many_failures_when_taking_delays_then_capped_at_max() {
    // Given
    let mut backoff = Backoff::new(DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_BACKOFF);

    // When: Far more failures than needed to reach the cap
    let last = (0..20).map(|_| backoff.next_delay()).last();

    // Then
    assert_eq!(last, Some(DEFAULT_MAX_BACKOFF));
    assert_eq!(backoff.current(), DEFAULT_MAX_BACKOFF);
}

/// WHAT: Reset returns to the initial delay
/// WHY: A successful connection starts the next outage from scratch
#[test]
fn given_grown_backoff_when_reset_then_initial_delay() {
    // Given
    let mut backoff = Backoff::new(Duration::from_millis(250), Duration::from_secs(5));
    backoff.next_delay();
    backoff.next_delay();

    // When
    backoff.reset();

    // Then
    assert_eq!(backoff.current(), Duration::from_millis(250));
}

/// WHAT: An initial delay above the cap is clamped
/// WHY: Misconfiguration must still respect the ceiling
#[test]
fn given_initial_above_max_when_creating_then_clamped() {
    // When
    let mut backoff = Backoff::new(Duration::from_secs(90), Duration::from_secs(60));

    // Then
    assert_eq!(backoff.next_delay(), Duration::from_secs(60));
}

/// WHAT: Only connected and ready count as an open link
/// WHY: Posting is gated on an open link
#[test]
fn given_states_when_checking_open_then_only_connected_and_ready() {
    // When/Then
    assert!(!ConnectionState::Disconnected.is_open());
    assert!(!ConnectionState::Connecting.is_open());
    assert!(ConnectionState::Connected.is_open());
    assert!(ConnectionState::Ready.is_open());
    assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
}
