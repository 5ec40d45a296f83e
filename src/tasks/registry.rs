use super::error::TaskError;
use super::payload::{TaskPayload, TaskTarget};
use super::GCP_TASK_HEADERS;
use async_trait::async_trait;
use http::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

const TASK_NAME_HEADER: &str = "X-AppEngine-TaskName";

/// A function that deferred tasks can invoke by name.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn run(&self, kwargs: Map<String, Value>) -> Result<Value, TaskError>;
}

/// Name-to-handler table used by [`exec_task`].
#[derive(Default, Clone)]
pub struct TaskRegistry {
    handlers: HashMap<(String, String), Arc<dyn TaskHandler>>,
}

impl TaskRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `target`, replacing any previous handler.
    pub fn register(&mut self, target: TaskTarget, handler: Arc<dyn TaskHandler>) {
        debug!(target = %target, "Registered task handler");
        self.handlers.insert(
            (target.module.to_string(), target.function.to_string()),
            handler,
        );
    }

    #[must_use]
    pub fn get(&self, module: &str, function: &str) -> Option<Arc<dyn TaskHandler>> {
        self.handlers
            .get(&(module.to_string(), function.to_string()))
            .cloned()
    }

    /// Registered names as `module.function`, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .handlers
            .keys()
            .map(|(module, function)| format!("{module}.{function}"))
            .collect();
        names.sort();
        names
    }
}

/// Check that every queue header is present.
pub fn validate_task_headers(headers: &HeaderMap) -> Result<(), TaskError> {
    match GCP_TASK_HEADERS.iter().find(|h| !headers.contains_key(**h)) {
        Some(missing) => Err(TaskError::InvalidRequest((*missing).to_string())),
        None => Ok(()),
    }
}

/// Run a delivered task.
///
/// The request must carry every queue header and name a registered
/// function. Only keyword arguments are supported.
pub async fn exec_task(
    registry: &TaskRegistry,
    payload: TaskPayload,
    headers: &HeaderMap,
) -> Result<Value, TaskError> {
    validate_task_headers(headers)?;

    let handler = registry
        .get(&payload.module, &payload.function)
        .ok_or_else(|| TaskError::UnknownFunction {
            module: payload.module.clone(),
            function: payload.function.clone(),
        })?;
    if !payload.args.is_empty() {
        return Err(TaskError::invalid_arguments(
            "positional arguments are not supported",
        ));
    }

    let task_name = headers
        .get(TASK_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    info!(
        task = %task_name,
        module = %payload.module,
        function = %payload.function,
        "Executing task"
    );
    handler.run(payload.kwargs).await
}

/// Reject keyword arguments not in `allowed`.
pub fn check_kwargs(kwargs: &Map<String, Value>, allowed: &[&str]) -> Result<(), TaskError> {
    match kwargs.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(unexpected) => Err(TaskError::invalid_arguments(format!(
            "unexpected keyword argument '{unexpected}'"
        ))),
        None => Ok(()),
    }
}

/// Decode a required keyword argument.
pub fn required_kwarg<T: DeserializeOwned>(
    kwargs: &Map<String, Value>,
    name: &str,
) -> Result<T, TaskError> {
    let value = kwargs
        .get(name)
        .ok_or_else(|| TaskError::invalid_arguments(format!("missing keyword argument '{name}'")))?;
    serde_json::from_value(value.clone())
        .map_err(|e| TaskError::invalid_arguments(format!("keyword argument '{name}': {e}")))
}
