//! Configuration loading and validation.
//!
//! Tasks are usually configured in code through [`TaskConfig`](crate::TaskConfig).
//! This module adds YAML schedule files describing command tasks.

mod error;
mod yaml;

pub use error::ConfigError;
pub use yaml::{CommandTaskConfig, ScheduleFile, YamlLoader};
