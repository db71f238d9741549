//! Task configuration, registered tasks and the task error type.
//!
//! A [`TaskConfig`] is what callers hand to the scheduler. Registration
//! validates it and turns it into a [`ScheduledTask`], which is immutable
//! from then on apart from its cancellation state.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::action::{Action, Middleware};
use super::payload::Payload;
use super::types::TaskName;
use crate::config::ConfigError;

/// Errors an invocation can end with.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The action reported a failure.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The deadline guard gave up waiting for the action.
    #[error("deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),

    /// External command exited with a non-zero code.
    #[error("command exited with code {code}: {stderr}")]
    CommandFailed { code: i32, stderr: String },

    /// The action panicked.
    #[error("action panicked: {0}")]
    Panicked(String),

    /// Generic error wrapper.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl TaskError {
    /// Check if this error was synthesized by the deadline guard.
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, TaskError::DeadlineExceeded(_))
    }
}

/// Configuration for registering a task.
///
/// # Example
///
/// ```
/// use metronome::{TaskConfig, action_fn, logging};
/// use std::time::Duration;
///
/// let action = action_fn(|_| async { Ok(()) });
/// let config = TaskConfig::new("heartbeat", Duration::from_secs(10), action)
///     .deadline(Duration::from_secs(2))
///     .middleware(logging());
/// ```
#[derive(Clone)]
pub struct TaskConfig {
    name: TaskName,
    interval: Duration,
    deadline: Option<Duration>,
    action: Action,
    middlewares: Vec<Middleware>,
}

impl TaskConfig {
    /// Create a config with no deadline and no middlewares.
    pub fn new(name: impl Into<TaskName>, interval: Duration, action: Action) -> Self {
        Self {
            name: name.into(),
            interval,
            deadline: None,
            action,
            middlewares: Vec::new(),
        }
    }

    /// Bound each invocation's observed duration.
    ///
    /// `Duration::ZERO` means no deadline.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Append a middleware. Earlier middlewares wrap later ones.
    pub fn middleware(mut self, middleware: Middleware) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Append several middlewares in order.
    pub fn middlewares(mut self, middlewares: impl IntoIterator<Item = Middleware>) -> Self {
        self.middlewares.extend(middlewares);
        self
    }

    /// Name of the task.
    pub fn name(&self) -> &TaskName {
        &self.name
    }

    /// Check the config and normalize the deadline.
    pub(crate) fn validate(mut self) -> Result<Self, ConfigError> {
        let schedulable = Instant::now().checked_add(self.interval).is_some();
        if self.interval.is_zero() || !schedulable {
            return Err(ConfigError::InvalidInterval(self.name.to_string()));
        }
        self.deadline = self.deadline.filter(|d| !d.is_zero());
        Ok(self)
    }
}

impl fmt::Debug for TaskConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskConfig")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .field("deadline", &self.deadline)
            .field("middlewares", &self.middlewares.len())
            .finish_non_exhaustive()
    }
}

/// A task owned by the scheduler.
pub struct ScheduledTask {
    name: TaskName,
    interval: Duration,
    deadline: Option<Duration>,
    action: Action,
    middlewares: Vec<Middleware>,
    cancellation: CancellationToken,
}

impl ScheduledTask {
    /// Validate `config` and attach the task's own cancellation token.
    pub(crate) fn new(
        config: TaskConfig,
        cancellation: CancellationToken,
    ) -> Result<Self, ConfigError> {
        let config = config.validate()?;
        Ok(Self {
            name: config.name,
            interval: config.interval,
            deadline: config.deadline,
            action: config.action,
            middlewares: config.middlewares,
            cancellation,
        })
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

    /// Whether the task has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub(crate) fn action(&self) -> &Action {
        &self.action
    }

    pub(crate) fn middlewares(&self) -> &[Middleware] {
        &self.middlewares
    }

    pub(crate) fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Build the payload for one invocation.
    ///
    /// The payload's token is a child of the task token, so stopping the
    /// scheduler also signals in-flight invocations.
    pub(crate) fn payload(&self) -> Payload {
        Payload::new(self.name.clone(), self.interval, self.deadline)
            .with_cancellation(self.cancellation.child_token())
    }
}

impl fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .field("deadline", &self.deadline)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}
