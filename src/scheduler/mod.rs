//! Scheduler engine.
//!
//! This module provides the task registry and its lifecycle: one execution
//! loop per task, started together and stopped together behind a join
//! barrier.

mod engine;
mod handle;
mod types;

pub use engine::Scheduler;
pub use handle::SchedulerHandle;
pub use types::{SchedulerError, SchedulerState};
