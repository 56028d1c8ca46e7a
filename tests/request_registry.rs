//! Integration tests for request tracking and route-change cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rstest::rstest;
use tokio::sync::watch;

use moliyachi_client::request::{
    HandleState, RequestRegistry, RouteChangeTrigger, RouteIdentity,
};

// =============================================================================
// Handle Lifecycle
// =============================================================================

#[rstest]
fn test_settled_callbacks_run_once() {
    let registry = RequestRegistry::new();
    let handle = registry.create();
    let runs = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&runs);
    handle.on_settled(move |_, state| {
        assert_eq!(state, HandleState::Cancelled);
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert!(handle.cancel());
    assert!(!handle.cancel());
    assert!(!handle.complete());
    registry.cancel_all();

    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[rstest]
fn test_callback_on_settled_handle_runs_immediately() {
    let registry = RequestRegistry::new();
    let handle = registry.create();
    handle.complete();

    let observed = Arc::new(parking_lot::Mutex::new(None));
    let slot = Arc::clone(&observed);
    handle.on_settled(move |_, state| *slot.lock() = Some(state));

    assert_eq!(*observed.lock(), Some(HandleState::Completed));
}

#[rstest]
fn test_completed_handle_is_not_cancelled_later() {
    let registry = RequestRegistry::new();
    let finished = registry.create();
    let pending = registry.create();

    assert!(finished.complete());
    assert_eq!(registry.cancel_all(), 1);

    assert_eq!(finished.state(), HandleState::Completed);
    assert_eq!(pending.state(), HandleState::Cancelled);
}

#[rstest]
#[tokio::test]
async fn test_cancelled_future_resolves() {
    let registry = Arc::new(RequestRegistry::new());
    let handle = registry.create();

    let waiter = {
        let handle = handle.clone();
        tokio::spawn(async move { handle.cancelled().await })
    };
    registry.cancel_all();

    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("cancelled() should resolve")
        .unwrap();
    assert!(handle.is_cancelled());
}

// =============================================================================
// Route Changes
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_watch_cancels_on_route_change() {
    let registry = Arc::new(RequestRegistry::new());
    let (sender, receiver) = watch::channel(RouteIdentity::parse("/dashboard"));
    let task = tokio::spawn(RouteChangeTrigger::new(Arc::clone(&registry)).watch(receiver));

    tokio::time::sleep(Duration::from_millis(10)).await;
    let stale = registry.create();
    assert!(!stale.is_cancelled());

    sender.send(RouteIdentity::parse("/goals")).unwrap();
    tokio::time::timeout(Duration::from_secs(1), stale.cancelled())
        .await
        .expect("route change should cancel");

    drop(sender);
    task.await.unwrap();
}

#[rstest]
#[tokio::test]
async fn test_watch_ends_with_unmount_cancel() {
    let registry = Arc::new(RequestRegistry::new());
    let (sender, receiver) = watch::channel(RouteIdentity::parse("/goals/1"));
    let task = tokio::spawn(RouteChangeTrigger::new(Arc::clone(&registry)).watch(receiver));

    tokio::time::sleep(Duration::from_millis(10)).await;
    let pending = registry.create();

    drop(sender);
    task.await.unwrap();

    assert!(pending.is_cancelled());
    assert_eq!(registry.count(), 0);
}

#[rstest]
fn test_new_requests_after_change_are_unaffected() {
    let registry = Arc::new(RequestRegistry::new());
    let mut trigger = RouteChangeTrigger::new(Arc::clone(&registry));
    trigger.route_changed(RouteIdentity::parse("/goals"));

    let old = registry.create();
    trigger.route_changed(RouteIdentity::parse("/goals/7"));
    let fresh = registry.create();

    assert!(old.is_cancelled());
    assert!(!fresh.is_cancelled());
    assert_eq!(trigger.current(), Some(&RouteIdentity::parse("/goals/7")));
}

// =============================================================================
// Concurrency
// =============================================================================

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_create_and_cancel() {
    let registry = Arc::new(RequestRegistry::new());
    let cancelled = Arc::new(AtomicUsize::new(0));

    let mut tasks = Vec::new();
    for worker in 0..8 {
        let registry = Arc::clone(&registry);
        let cancelled = Arc::clone(&cancelled);
        tasks.push(tokio::spawn(async move {
            let mut handles = Vec::new();
            for index in 0..200 {
                let handle = registry.create();
                if (worker + index) % 3 == 0 {
                    handle.complete();
                }
                handles.push(handle);
                if index % 50 == 0 {
                    cancelled.fetch_add(registry.cancel_all(), Ordering::SeqCst);
                    tokio::task::yield_now().await;
                }
            }
            handles
        }));
    }

    let mut handles = Vec::new();
    for task in tasks {
        handles.extend(task.await.unwrap());
    }
    cancelled.fetch_add(registry.cancel_all(), Ordering::SeqCst);

    assert_eq!(registry.count(), 0);
    assert!(handles.iter().all(|handle| handle.is_settled()));

    let observed = handles.iter().filter(|handle| handle.is_cancelled()).count();
    assert_eq!(observed, cancelled.load(Ordering::SeqCst));
}
