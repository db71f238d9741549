//! Scheduler engine implementation.
//!
//! The scheduler is responsible for:
//! - Registering tasks before it starts
//! - Running one independent execution loop per task
//! - Applying global middlewares around every task
//! - Stopping all loops together and waiting for them to exit

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::core::action::Middleware;
use crate::core::task::{ScheduledTask, TaskConfig};
use crate::execution::watch;

use super::handle::SchedulerHandle;
use super::types::{SchedulerError, SchedulerState};

/// Registry of periodic tasks.
///
/// # Example
///
/// ```no_run
/// use metronome::{Scheduler, TaskConfig, action_fn, logging};
/// use std::time::Duration;
///
/// # async fn run() -> Result<(), metronome::SchedulerError> {
/// let mut scheduler = Scheduler::with_middlewares([logging()]);
/// scheduler.register_task(TaskConfig::new(
///     "heartbeat",
///     Duration::from_secs(1),
///     action_fn(|_| async { Ok(()) }),
/// ))?;
///
/// let (handle, running) = scheduler.spawn();
/// tokio::time::sleep(Duration::from_secs(5)).await;
/// handle.stop().await;
/// running.await.expect("scheduler task panicked")?;
/// # Ok(())
/// # }
/// ```
pub struct Scheduler {
    tasks: Vec<Arc<ScheduledTask>>,
    global_middlewares: Arc<[Middleware]>,
    handle: SchedulerHandle,
}

impl Scheduler {
    /// Create an empty scheduler with no global middlewares.
    pub fn new() -> Self {
        Self::with_middlewares(Vec::new())
    }

    /// Create an empty scheduler whose middlewares wrap every task.
    ///
    /// Global middlewares are outermost: they run before and observe the
    /// outcome after all task-specific middlewares.
    pub fn with_middlewares(middlewares: impl IntoIterator<Item = Middleware>) -> Self {
        Self {
            tasks: Vec::new(),
            global_middlewares: middlewares.into_iter().collect(),
            handle: SchedulerHandle::new(),
        }
    }

    /// Register a task.
    ///
    /// Fails if the config is invalid or the scheduler has already started.
    pub fn register_task(&mut self, config: TaskConfig) -> Result<(), SchedulerError> {
        // Only `stop` on a handle can hold the lock while we have `&mut self`.
        let state = self
            .handle
            .state
            .try_read()
            .map(|state| *state)
            .unwrap_or(SchedulerState::Stopped);
        if state != SchedulerState::Idle {
            return Err(SchedulerError::NotIdle(state));
        }

        let task = ScheduledTask::new(config, self.handle.shutdown.child_token())?;
        tracing::debug!(
            task = %task.name(),
            interval = ?task.interval(),
            deadline = ?task.deadline(),
            "Task registered"
        );
        self.tasks.push(Arc::new(task));
        Ok(())
    }

    /// Registered tasks in registration order.
    pub fn tasks(&self) -> impl Iterator<Item = &ScheduledTask> + '_ {
        self.tasks.iter().map(|task| task.as_ref())
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no task is registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Get a handle that can stop the scheduler from elsewhere.
    pub fn handle(&self) -> SchedulerHandle {
        self.handle.clone()
    }

    /// Start one loop per task and wait until all of them exit.
    ///
    /// Loops only exit on cancellation, so this returns after [`stop`](Self::stop)
    /// (or [`SchedulerHandle::stop`]) is called. With no tasks it returns
    /// immediately. A scheduler can be started once.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        {
            let mut state = self.handle.state.write().await;
            match *state {
                SchedulerState::Idle => {}
                SchedulerState::Running => return Err(SchedulerError::AlreadyStarted),
                SchedulerState::Stopped => return Err(SchedulerError::AlreadyStopped),
            }
            *state = SchedulerState::Running;

            tracing::info!(tasks = self.tasks.len(), "Starting scheduler");
            for task in &self.tasks {
                self.handle
                    .tracker
                    .spawn(watch(Arc::clone(task), Arc::clone(&self.global_middlewares)));
            }
            self.handle.tracker.close();
        }

        self.handle.tracker.wait().await;

        *self.handle.state.write().await = SchedulerState::Stopped;
        tracing::info!("Scheduler stopped");
        Ok(())
    }

    /// Run [`start`](Self::start) on a new tokio task.
    ///
    /// If the returned handle is stopped before the spawned task gets to run,
    /// `start` reports [`SchedulerError::AlreadyStopped`] and no loop is ever
    /// launched.
    pub fn spawn(self) -> (SchedulerHandle, JoinHandle<Result<(), SchedulerError>>) {
        let handle = self.handle();
        let running = tokio::spawn(async move { self.start().await });
        (handle, running)
    }

    /// Cancel every task and wait for every loop to exit.
    ///
    /// See [`SchedulerHandle::stop`].
    pub async fn stop(&self) {
        self.handle.stop().await;
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
