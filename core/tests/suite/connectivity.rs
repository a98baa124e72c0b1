use std::time::Duration;

use core_test_support::connected_harness;
use core_test_support::spawn_harness;
use global_actions_core::CoordinatorOptions;
use global_actions_core::Phase;
use pretty_assertions::assert_eq;
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn primary_dying_while_showing_switches_to_fallback() {
    let harness = connected_harness().await;

    harness.handle.request_show(true, false);
    harness.primary().shown();
    harness.primary().set_connected(false);

    let snapshot = harness.snapshot().await;
    assert_eq!(snapshot.phase, Phase::ShowingFallback);
    assert!(!snapshot.primary_connected);
    assert_eq!(harness.fallback.shows(), vec![(true, false)]);
}

#[tokio::test(start_paused = true)]
async fn primary_dying_while_awaiting_cancels_timeout() {
    let harness = connected_harness().await;

    harness.handle.request_show(false, true);
    sleep(Duration::from_millis(1000)).await;
    harness.primary().set_connected(false);

    let snapshot = harness.snapshot().await;
    assert_eq!(snapshot.phase, Phase::ShowingFallback);
    assert!(!snapshot.timeout_armed);

    sleep(Duration::from_millis(6000)).await;
    harness.snapshot().await;
    assert_eq!(harness.fallback.shows(), vec![(false, true)]);
}

#[tokio::test(start_paused = true)]
async fn disconnect_after_timeout_does_not_duplicate_fallback() {
    let harness = connected_harness().await;

    harness.handle.request_show(true, true);
    sleep(Duration::from_millis(6000)).await;
    harness.primary().set_connected(false);
    harness.primary().set_connected(false);

    let snapshot = harness.snapshot().await;
    assert_eq!(snapshot.phase, Phase::ShowingFallback);
    assert_eq!(harness.fallback.shows(), vec![(true, true)]);
}

#[tokio::test(start_paused = true)]
async fn disconnect_while_idle_only_records_connectivity() {
    let harness = connected_harness().await;

    harness.primary().set_connected(false);

    let snapshot = harness.snapshot().await;
    assert!(!snapshot.primary_connected);
    assert_eq!(snapshot.phase, Phase::Idle);
    assert_eq!(harness.fallback.created(), 0);
}

#[tokio::test(start_paused = true)]
async fn reconnected_primary_serves_the_next_session() {
    let harness = spawn_harness(true, CoordinatorOptions::default());

    harness.handle.request_show(false, false);
    harness.snapshot().await;
    harness.fallback.dismiss();
    harness.primary().set_connected(true);
    harness.handle.request_show(true, true);

    let snapshot = harness.snapshot().await;
    assert_eq!(snapshot.phase, Phase::AwaitingPrimary);
    assert_eq!(harness.primary().show_calls(), 1);
    assert_eq!(harness.fallback.shows(), vec![(false, false)]);
}
