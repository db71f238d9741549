//! Command tasks loaded from YAML schedules, run end to end.

#![cfg(unix)]

use metronome::{Scheduler, TaskStats, YamlLoader, counting};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

fn load(yaml: &str) -> metronome::ScheduleFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    YamlLoader::load(file.path()).unwrap()
}

#[tokio::test]
async fn test_schedule_file_runs_commands() {
    let schedule = load(
        r#"
tasks:
  - name: ok
    interval_ms: 50
    command: "true"
  - name: fails
    interval_ms: 50
    command: sh
    args: ["-c", "exit 1"]
"#,
    );
    let ok_stats = TaskStats::new();
    let failing_stats = TaskStats::new();

    let mut scheduler = Scheduler::new();
    scheduler
        .register_task(
            schedule.tasks[0]
                .to_task_config()
                .middleware(counting(Arc::clone(&ok_stats))),
        )
        .unwrap();
    scheduler
        .register_task(
            schedule.tasks[1]
                .to_task_config()
                .middleware(counting(Arc::clone(&failing_stats))),
        )
        .unwrap();
    let (handle, running) = scheduler.spawn();

    tokio::time::sleep(Duration::from_millis(400)).await;
    handle.stop().await;
    running.await.unwrap().unwrap();

    let ok = ok_stats.snapshot();
    assert!(ok.successes >= 2, "got {ok:?}");
    assert_eq!(ok.failures, 0);

    let failing = failing_stats.snapshot();
    assert!(failing.failures >= 2, "got {failing:?}");
    assert_eq!(failing.successes, 0);
}

#[tokio::test]
async fn test_command_deadline_kills_process() {
    let schedule = load(
        r#"
tasks:
  - name: hang
    interval_ms: 50
    deadline_ms: 100
    command: sleep
    args: ["30"]
"#,
    );
    let stats = TaskStats::new();
    let mut scheduler = Scheduler::new();
    scheduler
        .register_task(
            schedule.tasks[0]
                .to_task_config()
                .middleware(counting(Arc::clone(&stats))),
        )
        .unwrap();
    let (handle, running) = scheduler.spawn();

    tokio::time::sleep(Duration::from_millis(400)).await;
    let stop_started = std::time::Instant::now();
    handle.stop().await;
    running.await.unwrap().unwrap();

    assert!(stop_started.elapsed() < Duration::from_secs(5));
    let totals = stats.snapshot();
    assert!(totals.deadline_exceeded >= 1, "got {totals:?}");
    assert_eq!(totals.successes, 0);
}
