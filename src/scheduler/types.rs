//! Scheduler type definitions.
//!
//! This module contains the error type and state enum for the scheduler.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors that can occur in the scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A task configuration was rejected at registration.
    #[error("invalid task configuration: {0}")]
    Config(#[from] ConfigError),

    /// Tasks can only be registered before the scheduler starts.
    #[error("tasks can only be registered while the scheduler is idle (state: {0:?})")]
    NotIdle(SchedulerState),

    /// `start` was called on a scheduler that is already running.
    #[error("scheduler is already running")]
    AlreadyStarted,

    /// `start` was called on a scheduler that has been stopped.
    #[error("scheduler has been stopped and cannot be restarted")]
    AlreadyStopped,
}

/// State of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Created, accepting registrations, not started.
    Idle,
    /// Task loops are running.
    Running,
    /// Stopped; terminal.
    Stopped,
}
