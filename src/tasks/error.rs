use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Invalid task request: missing header {0}")]
    InvalidRequest(String),

    #[error("Unknown task function: {module}.{function}")]
    UnknownFunction { module: String, function: String },

    #[error("Invalid task arguments: {0}")]
    InvalidArguments(String),

    #[error("Task handler failed: {0}")]
    Handler(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Task delivery failed: {0}")]
    Delivery(String),
}

impl TaskError {
    pub fn handler(msg: impl Into<String>) -> Self {
        TaskError::Handler(msg.into())
    }

    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        TaskError::InvalidArguments(msg.into())
    }
}
