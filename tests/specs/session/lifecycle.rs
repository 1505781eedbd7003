//! Session specs
//!
//! A session holds the resource from boot to confirmed shutdown, so
//! workers sharing a coordinator see one boot/stop cycle at a time.

use crate::prelude::*;
use similar_asserts::assert_eq;

type Runner = SessionRunner<TracedProbeAdapter<FakeProbeAdapter>, TracedControlAdapter<FakeControlAdapter>>;

fn runner(
    coordinator: &Arc<ResourceCoordinator>,
    probe: &FakeProbeAdapter,
    control: &FakeControlAdapter,
    config: Config,
) -> Runner {
    SessionRunner::new(
        Arc::clone(coordinator),
        TracedProbeAdapter::new(probe.clone()),
        TracedControlAdapter::new(control.clone()),
        config,
    )
}

fn starts_and_stops(control: &FakeControlAdapter) -> Vec<String> {
    control
        .calls()
        .into_iter()
        .map(|call| match call {
            ControlCall::Start { name } => format!("start {}", name),
            ControlCall::Stop { name } => format!("stop {}", name),
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn contending_session_times_out_with_holder() {
    let coordinator = Arc::new(ResourceCoordinator::new());
    let (probe, control) = linked_fakes();
    let first = runner(&coordinator, &probe, &control, fast_config());
    let second = runner(&coordinator, &probe, &control, fast_config());

    let busy = tokio::spawn(async move {
        first
            .run_exclusive(VM_A, "worker-1", || async {
                tokio::time::sleep(secs(5)).await;
                "done"
            })
            .await
    });
    tokio::time::sleep(secs(1)).await;

    let err = second
        .run_exclusive(VM_A, "worker-2", || async {})
        .await
        .unwrap_err();
    match err {
        SessionError::AcquireTimedOut { holder, waited, .. } => {
            assert_eq!(holder, "worker-1");
            assert_eq!(waited, secs(2));
        }
        other => panic!("expected acquire timeout, got {:?}", other),
    }

    assert_eq!(busy.await.unwrap().unwrap(), "done");
    assert_eq!(starts_and_stops(&control), vec!["start vm-A", "stop vm-A"]);
    assert!(!coordinator.is_locked(VM_A));
}

#[tokio::test(start_paused = true)]
async fn patient_sessions_run_back_to_back() {
    let coordinator = Arc::new(ResourceCoordinator::new());
    let (probe, control) = linked_fakes();
    let mut config = fast_config();
    config.coordinator.acquire_timeout = secs(60);

    let sessions: Vec<_> = (0..3)
        .map(|i| {
            let runner = runner(&coordinator, &probe, &control, config.clone());
            let probe = probe.clone();
            tokio::spawn(async move {
                let caller = format!("worker-{}", i);
                runner
                    .run_exclusive(VM_A, &caller, || async move {
                        // Each holder finds the resource booted and nobody else on it
                        let listing = vmgate_adapters::ProbeAdapter::list_resources(&probe)
                            .await
                            .unwrap();
                        assert!(listing.contains(",vm-A,vm-A,0,1,"), "{}", listing);
                        tokio::time::sleep(secs(3)).await;
                    })
                    .await
            })
        })
        .collect();

    for session in sessions {
        session.await.unwrap().unwrap();
    }

    let calls = starts_and_stops(&control);
    assert_eq!(calls.len(), 6);
    for pair in calls.chunks(2) {
        assert_eq!(pair, ["start vm-A", "stop vm-A"]);
    }
}

#[tokio::test(start_paused = true)]
async fn device_bound_resource_waits_for_bridge() {
    let coordinator = Arc::new(ResourceCoordinator::new());
    let probe = FakeProbeAdapter::new();
    let control = FakeControlAdapter::linked(probe.clone()).with_device(VM_A, "127.0.0.1:5555");
    let mut config = fast_config();
    config.resources[0].device = Some("127.0.0.1:5555".to_string());

    let value = runner(&coordinator, &probe, &control, config)
        .run_exclusive(VM_A, "worker-1", || async { 7 })
        .await
        .unwrap();

    assert_eq!(value, 7);
    assert_eq!(
        probe.calls().iter().filter(|c| **c == vmgate_adapters::ProbeCall::ListDevices).count(),
        1
    );
}
