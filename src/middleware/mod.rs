//! Middleware composition and built-in middlewares.
//!
//! [`build_middleware_chain`] folds a list of middlewares around an action so
//! that the first middleware in the list is the outermost: it runs first on
//! the way in and sees the final outcome last on the way out.

mod builtin;

pub use builtin::{StatsSnapshot, TaskStats, counting, logging, on_error};

use crate::core::action::{Action, Middleware};

/// Wrap `action` in `middlewares`, `middlewares[0]` outermost.
///
/// With an empty list the very same action is returned.
pub fn build_middleware_chain(action: Action, middlewares: &[Middleware]) -> Action {
    middlewares
        .iter()
        .rev()
        .fold(action, |inner, middleware| middleware(inner))
}
