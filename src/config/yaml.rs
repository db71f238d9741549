//! YAML schedule files.
//!
//! A schedule file lists command tasks:
//!
//! ```yaml
//! tasks:
//!   - name: disk_usage
//!     interval_ms: 60000
//!     deadline_ms: 5000
//!     command: df
//!     args: ["-h"]
//!   - name: heartbeat
//!     interval_ms: 1000
//!     command: "true"
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::ConfigError;
use crate::core::task::TaskConfig;
use crate::execution::CommandAction;

/// Contents of a schedule file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleFile {
    /// Command tasks to register.
    #[serde(default)]
    pub tasks: Vec<CommandTaskConfig>,
}

/// One command task from a schedule file.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandTaskConfig {
    /// Task name.
    pub name: String,
    /// Interval between fire attempts, in milliseconds.
    pub interval_ms: u64,
    /// Deadline of one invocation in milliseconds. Absent or zero means unbounded.
    #[serde(default)]
    pub deadline_ms: Option<u64>,
    /// Program to execute.
    pub command: String,
    /// Program arguments.
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory for the program.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

impl CommandTaskConfig {
    /// Interval between fire attempts.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Deadline of one invocation, `None` when unbounded.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Build the action that runs this command.
    pub fn action(&self) -> CommandAction {
        let mut action = CommandAction::new(&self.command).args(self.args.iter().cloned());
        if let Some(dir) = &self.working_dir {
            action = action.working_dir(dir);
        }
        action
    }

    /// Convert into a [`TaskConfig`] ready for registration.
    pub fn to_task_config(&self) -> TaskConfig {
        let action = self.action().into_action();
        let config = TaskConfig::new(self.name.as_str(), self.interval(), action);
        match self.deadline() {
            Some(deadline) => config.deadline(deadline),
            None => config,
        }
    }
}

/// YAML schedule loader.
pub struct YamlLoader;

impl YamlLoader {
    /// Load and validate a schedule file.
    pub fn load(path: impl AsRef<Path>) -> Result<ScheduleFile, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse and validate a schedule from a YAML string.
    pub fn parse(yaml: &str) -> Result<ScheduleFile, ConfigError> {
        let schedule: ScheduleFile = serde_yaml::from_str(yaml)?;
        Self::validate(&schedule)?;
        Ok(schedule)
    }

    fn validate(schedule: &ScheduleFile) -> Result<(), ConfigError> {
        if schedule.tasks.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "schedule must have at least one task".into(),
            ));
        }

        let mut names = HashSet::new();
        for task in &schedule.tasks {
            if task.name.trim().is_empty() {
                return Err(ConfigError::MissingField("name".into()));
            }
            if task.command.trim().is_empty() {
                return Err(ConfigError::MissingField(format!("{}.command", task.name)));
            }
            if task.interval_ms == 0 {
                return Err(ConfigError::InvalidInterval(task.name.clone()));
            }
            // Names must be unique within one file.
            if !names.insert(task.name.as_str()) {
                return Err(ConfigError::InvalidConfig(format!(
                    "duplicate task name: {}",
                    task.name
                )));
            }
        }

        Ok(())
    }
}
