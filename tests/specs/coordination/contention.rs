//! Coordination specs
//!
//! Workers sharing one coordinator never hold the same resource at once.

use crate::prelude::*;

#[tokio::test(start_paused = true)]
async fn second_worker_times_out_while_first_holds() {
    let coordinator = Arc::new(ResourceCoordinator::new());

    assert!(coordinator.acquire(VM_A, secs(2), "worker-1").await.unwrap());
    let holder = tokio::spawn({
        let coordinator = Arc::clone(&coordinator);
        async move {
            tokio::time::sleep(secs(5)).await;
            coordinator.release(VM_A, "worker-1")
        }
    });

    let start = Instant::now();
    let acquired = coordinator.acquire(VM_A, secs(2), "worker-2").await.unwrap();
    assert!(!acquired);
    assert_eq!(start.elapsed(), secs(2));
    assert_eq!(coordinator.holder(VM_A).as_deref(), Some("worker-1"));
    assert_eq!(coordinator.status().get(VM_A), Some(&true));

    holder.await.unwrap().unwrap();
    assert!(!coordinator.is_locked(VM_A));
    assert!(coordinator.acquire(VM_A, secs(2), "worker-2").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn waiting_worker_is_woken_by_release() {
    let coordinator = Arc::new(ResourceCoordinator::new());
    assert!(coordinator.acquire(VM_A, secs(2), "worker-1").await.unwrap());

    let waiter = tokio::spawn({
        let coordinator = Arc::clone(&coordinator);
        async move {
            let start = Instant::now();
            let acquired = coordinator.acquire(VM_A, secs(60), "worker-2").await.unwrap();
            (acquired, start.elapsed())
        }
    });

    tokio::time::sleep(secs(5)).await;
    coordinator.release(VM_A, "worker-1").unwrap();

    let (acquired, waited) = waiter.await.unwrap();
    assert!(acquired);
    assert_eq!(waited, secs(5));
    assert_eq!(coordinator.holder(VM_A).as_deref(), Some("worker-2"));
}

#[tokio::test(start_paused = true)]
async fn resources_are_independent() {
    let coordinator = ResourceCoordinator::new();

    assert!(coordinator.acquire(VM_A, secs(1), "worker-1").await.unwrap());
    assert!(coordinator.acquire("vm-B", Duration::ZERO, "worker-2").await.unwrap());

    let status = coordinator.status();
    assert_eq!(status.len(), 2);
    assert!(status.values().all(|locked| *locked));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_workers_take_turns() {
    let coordinator = Arc::new(ResourceCoordinator::new());
    let inside = Arc::new(std::sync::atomic::AtomicUsize::new(0));

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let coordinator = Arc::clone(&coordinator);
            let inside = Arc::clone(&inside);
            tokio::spawn(async move {
                let caller = format!("worker-{}", i);
                let lease = coordinator
                    .lease(VM_A, secs(30), &caller)
                    .await
                    .unwrap()
                    .expect("lease within timeout");
                let now = inside.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                assert_eq!(now, 0, "two holders at once");
                tokio::time::sleep(Duration::from_millis(5)).await;
                inside.fetch_sub(1, std::sync::atomic::Ordering::SeqCst);
                drop(lease);
            })
        })
        .collect();

    for worker in workers {
        worker.await.unwrap();
    }
    assert!(!coordinator.is_locked(VM_A));
}
