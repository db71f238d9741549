//! Per-invocation context handed to actions and middlewares.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::types::TaskName;

/// Read-only snapshot of the task that is being invoked.
///
/// A fresh payload is built for every tick. Besides identifying the task it
/// carries a cancellation token scoped to this single invocation: it fires
/// when the deadline guard gives up on the invocation or when the scheduler
/// is stopped. Nothing forces an action to observe it, but long-running
/// actions should, since an abandoned execution otherwise keeps running in
/// the background.
#[derive(Debug, Clone)]
pub struct Payload {
    name: TaskName,
    interval: Duration,
    deadline: Option<Duration>,
    cancellation: CancellationToken,
}

impl Payload {
    /// Create a payload with its own, never-cancelled token.
    pub fn new(name: impl Into<TaskName>, interval: Duration, deadline: Option<Duration>) -> Self {
        Self {
            name: name.into(),
            interval,
            deadline,
            cancellation: CancellationToken::new(),
        }
    }

    pub(crate) fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Name of the task.
    pub fn name(&self) -> &TaskName {
        &self.name
    }

    /// Interval between fire attempts.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Deadline of one invocation, `None` when unbounded.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Token cancelled when this invocation should stop early.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Whether this invocation has been asked to stop.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
