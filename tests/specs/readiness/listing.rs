//! Readiness specs
//!
//! Waits read the console's comma-separated listing and the device bridge's
//! device list, tolerating flaky probes.

use crate::prelude::*;

const LISTING: &str = "\
0,vm-base,Base,0,0,-1
1,vm-A,Android 9,131272,1,4242
2,vm-B,Android 9,0,2,-1
";

fn waiter(probe: &FakeProbeAdapter) -> ReadinessWaiter<TracedProbeAdapter<FakeProbeAdapter>> {
    ReadinessWaiter::new(
        TracedProbeAdapter::new(probe.clone()),
        fast_config().readiness,
    )
}

#[tokio::test(start_paused = true)]
async fn listing_states_are_read_per_resource() {
    let probe = FakeProbeAdapter::new();
    let waiter = waiter(&probe);

    probe.push_listing(LISTING);
    assert_eq!(
        waiter.observe(VM_A).await.unwrap(),
        Some(ResourceObservedState::Running)
    );
    probe.push_listing(LISTING);
    assert_eq!(
        waiter.observe("vm-B").await.unwrap(),
        Some(ResourceObservedState::Starting)
    );
    probe.push_listing(LISTING);
    assert_eq!(
        waiter.observe("vm-base").await.unwrap(),
        Some(ResourceObservedState::Stopped)
    );
    probe.push_listing(LISTING);
    assert_eq!(waiter.observe("vm-C").await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn boot_is_confirmed_once_listing_shows_running() {
    let probe = FakeProbeAdapter::new();
    probe.push_listing("1,vm-A,A,0,0,-1\n");
    probe.push_listing("1,vm-A,A,0,2,-1\n");
    probe.push_listing("");
    probe.push_listing_error("console locked");
    probe.set_resource_state(VM_A, "1");

    let outcome = waiter(&probe)
        .wait_until_running(VM_A, secs(30), secs(1))
        .await;

    assert_eq!(
        outcome,
        WaitOutcome::Ready {
            elapsed: secs(4),
            polls: 5
        }
    );
}

#[tokio::test(start_paused = true)]
async fn stuck_boot_reports_last_observation() {
    let probe = FakeProbeAdapter::new();
    probe.set_resource_state(VM_A, "2");

    let outcome = waiter(&probe)
        .wait_until_running(VM_A, secs(30), secs(1))
        .await;

    assert!(!outcome.is_ready());
    assert_eq!(outcome.elapsed(), secs(30));
    assert!(matches!(
        outcome,
        WaitOutcome::TimedOut {
            last_observed: Some(Observation::State(ResourceObservedState::Starting)),
            ..
        }
    ));
    assert!(outcome.to_string().contains("last observed: starting"));
}

#[tokio::test(start_paused = true)]
async fn shutdown_is_confirmed_when_resource_leaves_listing() {
    let probe = FakeProbeAdapter::new();
    probe.set_resource_state(VM_A, "1");

    let handle = tokio::spawn({
        let waiter = waiter(&probe);
        async move { waiter.wait_until_stopped(VM_A, secs(20), secs(1)).await }
    });

    tokio::time::sleep(Duration::from_millis(2500)).await;
    probe.remove_resource(VM_A);

    let outcome = handle.await.unwrap();
    assert_eq!(
        outcome,
        WaitOutcome::Ready {
            elapsed: secs(3),
            polls: 4
        }
    );
}
