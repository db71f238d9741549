//! Action and middleware function types.
//!
//! An [`Action`] is the unit of work a task runs on every tick. A
//! [`Middleware`] turns one action into another, which is how logging,
//! counting and error classification are layered around the base action.
//!
//! # Example
//!
//! ```
//! use metronome::{Action, action_fn, middleware_fn};
//!
//! let action = action_fn(|payload| async move {
//!     println!("tick for {}", payload.name());
//!     Ok(())
//! });
//!
//! let announce = middleware_fn(|next: Action| {
//!     action_fn(move |payload| {
//!         let next = next.clone();
//!         async move {
//!             println!("before {}", payload.name());
//!             let result = next(payload).await;
//!             println!("after");
//!             result
//!         }
//!     })
//! });
//! # let _ = (action, announce);
//! ```

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use super::payload::Payload;
use super::task::TaskError;

/// Outcome of one invocation.
pub type ActionResult = Result<(), TaskError>;

/// Future returned by an [`Action`].
pub type ActionFuture = BoxFuture<'static, ActionResult>;

/// A unit of work invoked with the task's [`Payload`].
pub type Action = Arc<dyn Fn(Payload) -> ActionFuture + Send + Sync>;

/// A wrapper transforming one [`Action`] into another.
pub type Middleware = Arc<dyn Fn(Action) -> Action + Send + Sync>;

/// Build an [`Action`] from an async closure.
pub fn action_fn<F, Fut>(f: F) -> Action
where
    F: Fn(Payload) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ActionResult> + Send + 'static,
{
    Arc::new(move |payload: Payload| f(payload).boxed())
}

/// Build a [`Middleware`] from a closure.
pub fn middleware_fn<F>(f: F) -> Middleware
where
    F: Fn(Action) -> Action + Send + Sync + 'static,
{
    Arc::new(f)
}
