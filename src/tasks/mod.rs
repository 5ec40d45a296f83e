//! Deferred task queue.
//!
//! A task is a [`TaskPayload`] (module, function, keyword arguments) encoded
//! as JSON and scheduled on a [`TaskQueue`] with an optional delay. When the
//! delay elapses the payload is handed to a [`TaskDelivery`], which either
//! runs it in-process or POSTs it to [`TASK_EXEC_HANDLER`] on a target
//! service. On the receiving side [`exec_task`] checks the queue headers and
//! dispatches to the handler registered for the `(module, function)` pair.

mod delivery;
mod error;
mod payload;
mod queue;
mod registry;

pub use delivery::{queue_headers, HttpDelivery, LocalDelivery, TaskDelivery};
pub use error::TaskError;
pub use payload::{queue_path, Location, Queue, TaskOptions, TaskPayload, TaskTarget};
pub use queue::{TaskQueue, TaskRequest};
pub use registry::{
    check_kwargs, exec_task, required_kwarg, validate_task_headers, TaskHandler, TaskRegistry,
};

/// Route that receives deferred task deliveries.
pub const TASK_EXEC_HANDLER: &str = "/_internal/safe-and-internal-only-access/task/exec";

/// Headers the queue attaches to every delivery. A request to
/// [`TASK_EXEC_HANDLER`] missing any of them is rejected.
pub const GCP_TASK_HEADERS: [&str; 5] = [
    "X-AppEngine-QueueName",
    "X-AppEngine-TaskName",
    "X-AppEngine-TaskRetryCount",
    "X-AppEngine-TaskExecutionCount",
    "X-AppEngine-TaskETA",
];

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
