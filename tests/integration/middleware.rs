//! Middleware ordering through the scheduler.

use crate::common::{event_log, recording_action, recording_middleware};
use metronome::{Scheduler, TaskConfig, TaskStats, counting, logging, on_error};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Two task middlewares `[m0, m1]` around a succeeding action.
#[tokio::test(start_paused = true)]
async fn test_task_middlewares_run_in_registration_order() {
    let log = event_log();
    let mut scheduler = Scheduler::new();
    scheduler
        .register_task(
            TaskConfig::new("ordered", Duration::from_millis(100), recording_action(&log))
                .middleware(recording_middleware(&log, "m0"))
                .middleware(recording_middleware(&log, "m1")),
        )
        .unwrap();
    let (handle, running) = scheduler.spawn();

    tokio::time::sleep(Duration::from_millis(150)).await;
    handle.stop().await;
    running.await.unwrap().unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["m0-before", "m1-before", "action", "m1-after", "m0-after"]
    );
}

/// Global middlewares wrap task middlewares.
#[tokio::test(start_paused = true)]
async fn test_global_middlewares_are_outermost() {
    let log = event_log();
    let mut scheduler = Scheduler::with_middlewares([
        recording_middleware(&log, "g0"),
        recording_middleware(&log, "g1"),
    ]);
    scheduler
        .register_task(
            TaskConfig::new("layered", Duration::from_millis(100), recording_action(&log))
                .middleware(recording_middleware(&log, "t0")),
        )
        .unwrap();
    let (handle, running) = scheduler.spawn();

    tokio::time::sleep(Duration::from_millis(150)).await;
    handle.stop().await;
    running.await.unwrap().unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "g0-before",
            "g1-before",
            "t0-before",
            "action",
            "t0-after",
            "g1-after",
            "g0-after"
        ]
    );
}

/// One set of global middlewares observes every task.
#[tokio::test(start_paused = true)]
async fn test_global_middlewares_apply_to_every_task() {
    let stats = TaskStats::new();
    let alerts = Arc::new(AtomicU32::new(0));
    let alert_count = Arc::clone(&alerts);
    let mut scheduler = Scheduler::with_middlewares([
        logging(),
        counting(Arc::clone(&stats)),
        on_error(move |_, _| {
            alert_count.fetch_add(1, Ordering::SeqCst);
        }),
    ]);
    scheduler
        .register_task(TaskConfig::new(
            "ok",
            Duration::from_millis(100),
            metronome::action_fn(|_| async { Ok(()) }),
        ))
        .unwrap();
    scheduler
        .register_task(TaskConfig::new(
            "broken",
            Duration::from_millis(100),
            metronome::action_fn(|_| async {
                Err(metronome::TaskError::ExecutionFailed("broken".into()))
            }),
        ))
        .unwrap();
    let (handle, running) = scheduler.spawn();

    tokio::time::sleep(Duration::from_millis(250)).await;
    handle.stop().await;
    running.await.unwrap().unwrap();

    let totals = stats.snapshot();
    assert_eq!(totals.invocations, 4);
    assert_eq!(totals.successes, 2);
    assert_eq!(totals.failures, 2);
    assert_eq!(alerts.load(Ordering::SeqCst), 2);
}

/// A panicking action reaches the middlewares as `Panicked`, with or without a deadline.
#[tokio::test(start_paused = true)]
async fn test_panics_are_reported_to_middlewares() {
    for deadline in [Duration::ZERO, Duration::from_secs(5)] {
        let stats = TaskStats::new();
        let panics = Arc::new(AtomicU32::new(0));
        let panic_count = Arc::clone(&panics);
        let mut scheduler = Scheduler::with_middlewares([
            counting(Arc::clone(&stats)),
            on_error(move |_, err| {
                if matches!(err, metronome::TaskError::Panicked(_)) {
                    panic_count.fetch_add(1, Ordering::SeqCst);
                }
            }),
        ]);
        scheduler
            .register_task(
                TaskConfig::new(
                    "explodes",
                    Duration::from_millis(100),
                    metronome::action_fn(|payload| async move {
                        if payload.name().as_str() == "explodes" {
                            panic!("boom");
                        }
                        Ok(())
                    }),
                )
                .deadline(deadline),
            )
            .unwrap();
        let (handle, running) = scheduler.spawn();

        tokio::time::sleep(Duration::from_millis(350)).await;
        handle.stop().await;
        running.await.unwrap().unwrap();

        let totals = stats.snapshot();
        assert_eq!(totals.invocations, 3, "deadline {deadline:?}");
        assert_eq!(totals.failures, 3, "deadline {deadline:?}");
        assert_eq!(panics.load(Ordering::SeqCst), 3, "deadline {deadline:?}");
    }
}
