use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

/// Queue region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    #[default]
    #[serde(rename = "us-central1")]
    UsCentral1,
    #[serde(rename = "us-east1")]
    UsEast1,
}

impl Location {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Location::UsCentral1 => "us-central1",
            Location::UsEast1 => "us-east1",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Queue {
    #[default]
    #[serde(rename = "default")]
    Default,
}

impl Queue {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Queue::Default => "default",
        }
    }
}

impl fmt::Display for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully qualified queue name.
#[must_use]
pub fn queue_path(project: &str, location: Location, queue: Queue) -> String {
    format!("projects/{project}/locations/{location}/queues/{queue}")
}

/// JSON body of a deferred task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPayload {
    pub module: String,
    pub function: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

impl TaskPayload {
    #[must_use]
    pub fn new(target: TaskTarget, kwargs: Map<String, Value>) -> Self {
        Self {
            module: target.module.to_string(),
            function: target.function.to_string(),
            args: Vec::new(),
            kwargs,
        }
    }
}

/// A function that can be deferred, addressed by module and function name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskTarget {
    pub module: &'static str,
    pub function: &'static str,
}

impl TaskTarget {
    #[must_use]
    pub const fn new(module: &'static str, function: &'static str) -> Self {
        Self { module, function }
    }
}

impl fmt::Display for TaskTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.function)
    }
}

/// Scheduling options for a new task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskOptions {
    /// `None` or zero runs the task as soon as possible.
    pub delay: Option<Duration>,
    pub location: Location,
    pub queue: Queue,
}

impl TaskOptions {
    #[must_use]
    pub fn delayed(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn in_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    #[must_use]
    pub fn on_queue(mut self, queue: Queue) -> Self {
        self.queue = queue;
        self
    }
}
