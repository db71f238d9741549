//! Identifier types.

use std::fmt;
use std::sync::Arc;

/// Name of a registered task.
///
/// Names are used for observability only. Two tasks may share a name and are
/// still scheduled independently. Cloning is cheap, so the name can be handed
/// to every invocation without copying the string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskName(Arc<str>);

impl TaskName {
    /// Create a new TaskName from a string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::from(name.into()))
    }

    /// Get the underlying string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for TaskName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
