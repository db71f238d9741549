//! Per-task execution loop.
//!
//! Each registered task gets one loop. The loop waits for either its interval
//! timer or its cancellation token. On a tick it runs the wrapped action to
//! completion (or to its deadline) before looking at the timer again, so a
//! task never overlaps with itself. Ticks missed in the meantime collapse
//! into at most one pending fire and are not made up.

use std::sync::Arc;

use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::Instrument;

use crate::core::action::{Action, Middleware};
use crate::core::task::ScheduledTask;
use crate::middleware::build_middleware_chain;

use super::deadline::{catch_panics, join_error_to_task_error, with_deadline};

/// Compose the action a task runs on every tick.
///
/// Layers from inside out: base action with panics turned into
/// [`TaskError::Panicked`](crate::TaskError::Panicked), deadline guard, task
/// middlewares, global middlewares.
pub fn compose_action(task: &ScheduledTask, global_middlewares: &[Middleware]) -> Action {
    let base = catch_panics(Arc::clone(task.action()));
    let guarded = with_deadline(base, task.deadline());
    let with_task = build_middleware_chain(guarded, task.middlewares());
    build_middleware_chain(with_task, global_middlewares)
}

/// Run the loop for `task` until its cancellation token fires.
pub(crate) async fn watch(task: Arc<ScheduledTask>, global_middlewares: Arc<[Middleware]>) {
    let action = compose_action(&task, &global_middlewares);
    let period = task.interval();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::debug!(
        task = %task.name(),
        interval = ?period,
        deadline = ?task.deadline(),
        "Task loop started"
    );

    loop {
        tokio::select! {
            biased;

            _ = task.cancellation().cancelled() => break,

            _ = ticker.tick() => {
                let payload = task.payload();
                let span = tracing::info_span!("task", name = %task.name());
                let invocation = tokio::spawn(action(payload).instrument(span));

                // Outcomes belong to the middlewares. Only a panic raised by a
                // middleware itself gets here.
                if let Err(e) = invocation.await {
                    let err = join_error_to_task_error(e);
                    tracing::error!(task = %task.name(), error = %err, "Task invocation aborted");
                }
            }
        }
    }

    tracing::debug!(task = %task.name(), "Task loop stopped");
}
