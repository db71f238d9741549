//! Task execution: the deadline guard, the per-task loop and command actions.

mod command;
mod deadline;
mod watch;

pub use command::CommandAction;
pub use deadline::with_deadline;
pub use watch::compose_action;

pub(crate) use watch::watch;
