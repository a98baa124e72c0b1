use std::time::Duration;

use core_test_support::connected_harness;
use core_test_support::spawn_harness;
use global_actions_core::CoordinatorError;
use global_actions_core::CoordinatorOptions;
use global_actions_core::Phase;
use global_actions_core::ReentryPolicy;
use pretty_assertions::assert_eq;
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn repeated_request_resnapshots_and_rearms() {
    let harness = connected_harness().await;

    harness.handle.request_show(false, false);
    sleep(Duration::from_millis(3000)).await;
    harness.handle.request_show(true, true);

    let snapshot = harness.snapshot().await;
    assert!(snapshot.keyguard_showing);
    assert!(snapshot.device_provisioned);
    assert_eq!(harness.primary().show_calls(), 2);

    // Only the re-armed timer fires, at t=8000.
    sleep(Duration::from_millis(4000)).await;
    assert_eq!(harness.snapshot().await.phase, Phase::AwaitingPrimary);
    sleep(Duration::from_millis(2000)).await;
    assert_eq!(harness.snapshot().await.phase, Phase::ShowingFallback);
    assert_eq!(harness.fallback.shows(), vec![(true, true)]);
}

#[tokio::test(start_paused = true)]
async fn ignore_policy_keeps_the_first_request() {
    let harness = spawn_harness(
        true,
        CoordinatorOptions {
            reentry: ReentryPolicy::Ignore,
        },
    );
    harness.primary().set_connected(true);

    harness.handle.request_show(false, false);
    harness.handle.request_show(true, true);

    let snapshot = harness.snapshot().await;
    assert!(!snapshot.keyguard_showing);
    assert!(!snapshot.device_provisioned);
    assert_eq!(harness.primary().show_calls(), 1);

    // A new session after dismissal is accepted again.
    harness.primary().dismissed();
    harness.handle.request_show(true, true);
    assert!(harness.snapshot().await.keyguard_showing);
    assert_eq!(harness.primary().show_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn shutdown_closes_the_handle() {
    let harness = connected_harness().await;

    harness.handle.request_show(true, true);
    harness.handle.shutdown();

    assert_eq!(harness.handle.snapshot().await, Err(CoordinatorError::Closed));
    // Requests after shutdown are dropped silently.
    harness.handle.request_show(false, false);
    assert!(harness.fallback.shows().is_empty());
}
