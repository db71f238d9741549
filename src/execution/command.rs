//! External command actions.
//!
//! [`CommandAction`] runs a program on every tick. It is the cooperative case
//! of the deadline guard: when the invocation's cancellation token fires,
//! because the deadline passed or the scheduler is stopping, the child process
//! is killed instead of being left running in the background.
//!
//! ```rust
//! use metronome::{CommandAction, TaskConfig};
//! use std::time::Duration;
//!
//! let action = CommandAction::new("df").arg("-h").into_action();
//! let config = TaskConfig::new("disk_usage", Duration::from_secs(60), action)
//!     .deadline(Duration::from_secs(5));
//! ```

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;

use crate::core::action::{Action, ActionResult, action_fn};
use crate::core::payload::Payload;
use crate::core::task::TaskError;

/// An action that executes an external program.
#[derive(Debug, Clone)]
pub struct CommandAction {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    working_dir: Option<PathBuf>,
}

impl CommandAction {
    /// Create an action running `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            working_dir: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add a single environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Set the working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Get the program.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Get the arguments.
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Run the command once.
    pub async fn run(&self, payload: Payload) -> ActionResult {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        let child = cmd
            .spawn()
            .map_err(|e| TaskError::ExecutionFailed(format!("{}: {}", self.program, e)))?;

        // Dropping the wait future drops the child, which kills it.
        let output = tokio::select! {
            output = child.wait_with_output() => {
                output.map_err(|e| TaskError::ExecutionFailed(e.to_string()))?
            }
            _ = payload.cancellation().cancelled() => {
                tracing::debug!(
                    task = %payload.name(),
                    program = %self.program,
                    "Killing cancelled command"
                );
                return Err(TaskError::ExecutionFailed(format!(
                    "{} cancelled before completion",
                    self.program
                )));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            tracing::debug!(task = %payload.name(), "stdout: {}", line);
        }

        if output.status.success() {
            Ok(())
        } else {
            Err(TaskError::CommandFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    /// Convert into an [`Action`].
    pub fn into_action(self) -> Action {
        let command = Arc::new(self);
        action_fn(move |payload| {
            let command = Arc::clone(&command);
            async move { command.run(payload).await }
        })
    }
}
