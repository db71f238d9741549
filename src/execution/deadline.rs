//! Deadline enforcement for a single invocation.
//!
//! [`with_deadline`] races the action against a timer. When the timer wins
//! the caller gets [`TaskError::DeadlineExceeded`] right away, but the action
//! itself is **not** aborted: it keeps running on its own tokio task until it
//! finishes and its result is thrown away. The guard bounds how long the
//! scheduler waits, not how long the work runs. The only lever it has is the
//! payload's cancellation token, which it cancels on timeout so that actions
//! polling it can give up early.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::task::JoinError;

use crate::core::action::Action;
use crate::core::payload::Payload;
use crate::core::task::TaskError;

/// Wrap `action` so each invocation is bounded by `deadline`.
///
/// With no deadline (or a zero one) the action is returned unchanged.
pub fn with_deadline(action: Action, deadline: Option<Duration>) -> Action {
    let deadline = match deadline {
        Some(d) if !d.is_zero() => d,
        _ => return action,
    };

    Arc::new(move |payload: Payload| {
        let action = Arc::clone(&action);
        async move {
            let cancellation = payload.cancellation().clone();
            let execution = tokio::spawn(action(payload));

            match tokio::time::timeout(deadline, execution).await {
                Ok(Ok(result)) => result,
                Ok(Err(join_error)) => Err(join_error_to_task_error(join_error)),
                Err(_) => {
                    cancellation.cancel();
                    Err(TaskError::DeadlineExceeded(deadline))
                }
            }
        }
        .boxed()
    })
}

/// Wrap `action` so a panic while running it ends the invocation with
/// [`TaskError::Panicked`] instead of unwinding through the caller.
pub(crate) fn catch_panics(action: Action) -> Action {
    Arc::new(move |payload: Payload| {
        let action = Arc::clone(&action);
        async move {
            let invocation = AssertUnwindSafe(async move { action(payload).await });
            match invocation.catch_unwind().await {
                Ok(result) => result,
                Err(panic) => Err(TaskError::Panicked(panic_message(panic))),
            }
        }
        .boxed()
    })
}

/// Map a failed join of an invocation to a [`TaskError`].
pub(crate) fn join_error_to_task_error(error: JoinError) -> TaskError {
    if error.is_panic() {
        TaskError::Panicked(panic_message(error.into_panic()))
    } else {
        TaskError::ExecutionFailed("invocation was cancelled by the runtime".to_string())
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
