//! Scheduler handle for controlling the scheduler.
//!
//! This module provides the `SchedulerHandle` type that lets code other than
//! the one awaiting [`Scheduler::start`](super::Scheduler::start) stop the
//! scheduler and observe its state.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::types::SchedulerState;

/// Handle for controlling the scheduler.
#[derive(Clone)]
pub struct SchedulerHandle {
    /// Parent of every task token.
    pub(crate) shutdown: CancellationToken,
    /// Join barrier for the task loops.
    pub(crate) tracker: TaskTracker,
    pub(crate) state: Arc<RwLock<SchedulerState>>,
}

impl SchedulerHandle {
    pub(crate) fn new() -> Self {
        Self {
            shutdown: CancellationToken::new(),
            tracker: TaskTracker::new(),
            state: Arc::new(RwLock::new(SchedulerState::Idle)),
        }
    }

    /// Stop the scheduler and wait for every task loop to exit.
    ///
    /// Loops only notice cancellation between invocations, so this waits out
    /// at most one in-flight invocation per task. That wait is bounded by the
    /// task's deadline; a task without a deadline whose action never returns
    /// blocks this call forever.
    ///
    /// Calling `stop` again, or before `start`, is harmless.
    pub async fn stop(&self) {
        {
            let mut state = self.state.write().await;
            if *state != SchedulerState::Stopped {
                tracing::info!(
                    active_loops = self.tracker.len(),
                    "Stopping scheduler, waiting for task loops to exit"
                );
            }
            *state = SchedulerState::Stopped;
            self.shutdown.cancel();
            self.tracker.close();
        }

        self.tracker.wait().await;
        tracing::debug!("All task loops exited");
    }

    /// Get the current scheduler state.
    pub async fn state(&self) -> SchedulerState {
        *self.state.read().await
    }

    /// Check if the scheduler is running.
    pub async fn is_running(&self) -> bool {
        *self.state.read().await == SchedulerState::Running
    }

    /// Number of task loops that have not exited yet.
    pub fn active_loops(&self) -> usize {
        self.tracker.len()
    }
}
