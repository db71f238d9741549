//! Deadline enforcement through the scheduler.

use crate::common::{Calls, sleeping_action};
use metronome::{Payload, Scheduler, TaskConfig, TaskStats, action_fn, counting};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Interval 100ms, deadline 50ms, action 150ms, observed for 500ms:
/// about five invocations, every one reported as deadline exceeded.
#[tokio::test(start_paused = true)]
async fn test_slow_action_always_exceeds_deadline() {
    let calls = Calls::new();
    let stats = TaskStats::new();
    let mut scheduler = Scheduler::new();
    scheduler
        .register_task(
            TaskConfig::new(
                "too_slow",
                Duration::from_millis(100),
                sleeping_action(&calls, Duration::from_millis(150)),
            )
            .deadline(Duration::from_millis(50))
            .middleware(counting(Arc::clone(&stats))),
        )
        .unwrap();
    let (handle, running) = scheduler.spawn();

    tokio::time::sleep(Duration::from_millis(500)).await;
    handle.stop().await;
    running.await.unwrap().unwrap();

    let totals = stats.snapshot();
    assert!(
        (4..=5).contains(&totals.invocations),
        "expected about 5 invocations, got {}",
        totals.invocations
    );
    assert_eq!(totals.deadline_exceeded, totals.invocations);
    assert_eq!(totals.successes, 0);
    assert_eq!(totals.failures, 0);
    assert_eq!(u64::from(calls.count()), totals.invocations);
}

/// Interval 1s, no deadline, immediate success, observed for 3.5s:
/// three successful invocations and no timeouts.
#[tokio::test(start_paused = true)]
async fn test_fast_action_without_deadline_succeeds() {
    let calls = Calls::new();
    let stats = TaskStats::new();
    let mut scheduler = Scheduler::new();
    scheduler
        .register_task(
            TaskConfig::new(
                "instant",
                Duration::from_secs(1),
                sleeping_action(&calls, Duration::ZERO),
            )
            .deadline(Duration::ZERO)
            .middleware(counting(Arc::clone(&stats))),
        )
        .unwrap();
    let (handle, running) = scheduler.spawn();

    tokio::time::sleep(Duration::from_millis(3500)).await;
    handle.stop().await;
    running.await.unwrap().unwrap();

    let totals = stats.snapshot();
    assert_eq!(totals.successes, 3);
    assert_eq!(totals.deadline_exceeded, 0);
    assert_eq!(totals.invocations, 3);
}

/// An action shorter than its deadline always reports its own outcome.
#[tokio::test(start_paused = true)]
async fn test_action_within_deadline_reports_real_outcome() {
    let stats = TaskStats::new();
    let flaky = action_fn(|_| async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Err(metronome::TaskError::ExecutionFailed("business".into()))
    });
    let mut scheduler = Scheduler::new();
    scheduler
        .register_task(
            TaskConfig::new("flaky", Duration::from_millis(100), flaky)
                .deadline(Duration::from_millis(50))
                .middleware(counting(Arc::clone(&stats))),
        )
        .unwrap();
    let (handle, running) = scheduler.spawn();

    tokio::time::sleep(Duration::from_millis(350)).await;
    handle.stop().await;
    running.await.unwrap().unwrap();

    let totals = stats.snapshot();
    assert_eq!(totals.invocations, 3);
    assert_eq!(totals.failures, 3);
    assert_eq!(totals.deadline_exceeded, 0);
}

/// The payload describes the task being invoked.
#[tokio::test(start_paused = true)]
async fn test_payload_carries_task_settings() {
    let seen: Arc<Mutex<Vec<(String, Duration, Option<Duration>)>>> =
        Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let inspect = action_fn(move |payload: Payload| {
        let sink = Arc::clone(&sink);
        async move {
            sink.lock().unwrap().push((
                payload.name().to_string(),
                payload.interval(),
                payload.deadline(),
            ));
            Ok(())
        }
    });
    let mut scheduler = Scheduler::new();
    scheduler
        .register_task(
            TaskConfig::new("inspect", Duration::from_millis(40), inspect)
                .deadline(Duration::from_millis(30)),
        )
        .unwrap();
    let (handle, running) = scheduler.spawn();

    tokio::time::sleep(Duration::from_millis(90)).await;
    handle.stop().await;
    running.await.unwrap().unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    for entry in seen.iter() {
        assert_eq!(
            entry,
            &(
                "inspect".to_string(),
                Duration::from_millis(40),
                Some(Duration::from_millis(30))
            )
        );
    }
}
