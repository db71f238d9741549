//! metronome - a minimal in-process periodic task runner.
//!
//! Register named actions with a fixed interval, an optional deadline and a
//! stack of middlewares, then run them until stopped:
//!
//! - every task gets its own timer loop, independent of the others;
//! - a task never overlaps with itself; ticks missed while it runs are dropped;
//! - a deadline bounds how long the loop waits for one invocation, but the
//!   abandoned work is only asked, through the payload's cancellation token,
//!   to stop;
//! - middlewares compose outermost-first, with scheduler-wide middlewares
//!   wrapping task-specific ones.
//!
//! ```no_run
//! use metronome::{Scheduler, TaskConfig, TaskStats, action_fn, counting, logging};
//! use std::time::Duration;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let stats = TaskStats::new();
//! let mut scheduler = Scheduler::with_middlewares([logging(), counting(stats.clone())]);
//! scheduler.register_task(
//!     TaskConfig::new("refresh", Duration::from_secs(30), action_fn(|payload| async move {
//!         println!("refreshing for {}", payload.name());
//!         Ok(())
//!     }))
//!     .deadline(Duration::from_secs(10)),
//! )?;
//!
//! let (handle, running) = scheduler.spawn();
//! tokio::signal::ctrl_c().await?;
//! handle.stop().await;
//! running.await??;
//! println!("{:?}", stats.snapshot());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod execution;
pub mod middleware;
pub mod scheduler;

pub use crate::config::{CommandTaskConfig, ConfigError, ScheduleFile, YamlLoader};
pub use crate::core::action::{
    Action, ActionFuture, ActionResult, Middleware, action_fn, middleware_fn,
};
pub use crate::core::payload::Payload;
pub use crate::core::task::{ScheduledTask, TaskConfig, TaskError};
pub use crate::core::types::TaskName;
pub use crate::execution::{CommandAction, compose_action, with_deadline};
pub use crate::middleware::{
    StatsSnapshot, TaskStats, build_middleware_chain, counting, logging, on_error,
};
pub use crate::scheduler::{Scheduler, SchedulerError, SchedulerHandle, SchedulerState};
