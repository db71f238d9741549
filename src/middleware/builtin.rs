//! Built-in middlewares.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::core::action::{Action, Middleware, action_fn, middleware_fn};
use crate::core::payload::Payload;
use crate::core::task::TaskError;

/// Log every invocation with its outcome and elapsed time.
pub fn logging() -> Middleware {
    middleware_fn(|next: Action| {
        action_fn(move |payload: Payload| {
            let next = Arc::clone(&next);
            async move {
                let name = payload.name().clone();
                let started = Instant::now();
                tracing::debug!(task = %name, "Task invocation started");

                let result = next(payload).await;
                let elapsed = started.elapsed();

                match &result {
                    Ok(()) => tracing::info!(task = %name, ?elapsed, "Task completed"),
                    Err(e) if e.is_deadline_exceeded() => {
                        tracing::warn!(task = %name, ?elapsed, "Task exceeded its deadline")
                    }
                    Err(e) => tracing::warn!(task = %name, ?elapsed, error = %e, "Task failed"),
                }
                result
            }
        })
    })
}

/// Outcome counters for one or more tasks.
///
/// Share one instance across tasks to aggregate, or give each task its own.
#[derive(Debug, Default)]
pub struct TaskStats {
    invocations: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    deadline_exceeded: AtomicU64,
}

/// Point-in-time copy of [`TaskStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Invocations that have finished, whatever their outcome.
    pub invocations: u64,
    /// Invocations that returned `Ok`.
    pub successes: u64,
    /// Invocations that failed for a reason other than the deadline.
    pub failures: u64,
    /// Invocations cut off by the deadline guard.
    pub deadline_exceeded: u64,
}

impl TaskStats {
    /// Create zeroed counters.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Read all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            invocations: self.invocations.load(Ordering::SeqCst),
            successes: self.successes.load(Ordering::SeqCst),
            failures: self.failures.load(Ordering::SeqCst),
            deadline_exceeded: self.deadline_exceeded.load(Ordering::SeqCst),
        }
    }

    fn record(&self, result: &Result<(), TaskError>) {
        let counter = match result {
            Ok(()) => &self.successes,
            Err(e) if e.is_deadline_exceeded() => &self.deadline_exceeded,
            Err(_) => &self.failures,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        self.invocations.fetch_add(1, Ordering::SeqCst);
    }
}

/// Count invocation outcomes into `stats`.
pub fn counting(stats: Arc<TaskStats>) -> Middleware {
    middleware_fn(move |next: Action| {
        let stats = Arc::clone(&stats);
        action_fn(move |payload| {
            let next = Arc::clone(&next);
            let stats = Arc::clone(&stats);
            async move {
                let result = next(payload).await;
                stats.record(&result);
                result
            }
        })
    })
}

/// Call `callback` for every failed invocation, then propagate the error.
///
/// This is the hook for alerting. Deadline overruns are reported too; use
/// [`TaskError::is_deadline_exceeded`] to tell them apart.
pub fn on_error<F>(callback: F) -> Middleware
where
    F: Fn(&Payload, &TaskError) + Send + Sync + 'static,
{
    let callback = Arc::new(callback);
    middleware_fn(move |next: Action| {
        let callback = Arc::clone(&callback);
        action_fn(move |payload: Payload| {
            let next = Arc::clone(&next);
            let callback = Arc::clone(&callback);
            async move {
                let result = next(payload.clone()).await;
                if let Err(ref e) = result {
                    callback(&payload, e);
                }
                result
            }
        })
    })
}
