use super::delivery::TaskDelivery;
use super::error::TaskError;
use super::payload::{queue_path, Queue, TaskOptions, TaskPayload, TaskTarget};
use super::TASK_EXEC_HANDLER;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Method};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A scheduled HTTP request that will execute a task.
#[derive(Debug, Clone)]
pub struct TaskRequest {
    /// `projects/{p}/locations/{l}/queues/{q}/tasks/{id}`
    pub name: String,
    pub task_id: String,
    pub queue: Queue,
    pub http_method: Method,
    pub relative_uri: &'static str,
    pub body: Bytes,
    pub headers: HeaderMap,
    pub created_at: DateTime<Utc>,
    pub schedule_time: Option<DateTime<Utc>>,
}

/// Schedules tasks and hands them to a [`TaskDelivery`] when due.
///
/// Each task is a spawned tokio task that sleeps for its delay and then
/// delivers once. A failed delivery is logged and dropped.
pub struct TaskQueue {
    project_id: String,
    delivery: Arc<dyn TaskDelivery>,
    pending: Arc<AtomicUsize>,
}

impl TaskQueue {
    #[must_use]
    pub fn new(project_id: impl Into<String>, delivery: Arc<dyn TaskDelivery>) -> Self {
        Self {
            project_id: project_id.into(),
            delivery,
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Tasks created but not yet delivered.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Wait up to `timeout` for scheduled tasks to be delivered.
    ///
    /// Returns the number of tasks still pending when the wait ended.
    pub async fn drain(&self, timeout: Duration) -> usize {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.pending() > 0 && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
        self.pending()
    }

    /// Schedule `payload` and return the task name.
    ///
    /// Must be called from within a tokio runtime.
    pub fn create_task(
        &self,
        payload: &TaskPayload,
        options: &TaskOptions,
    ) -> Result<String, TaskError> {
        let body = Bytes::from(serde_json::to_vec(payload)?);
        let parent = queue_path(&self.project_id, options.location, options.queue);
        let task_id = Uuid::new_v4().simple().to_string();
        let name = format!("{parent}/tasks/{task_id}");

        let created_at = Utc::now();
        let delay = options.delay.filter(|d| !d.is_zero());
        let schedule_time = delay
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .and_then(|d| created_at.checked_add_signed(d));

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let request = TaskRequest {
            name: name.clone(),
            task_id,
            queue: options.queue,
            http_method: Method::POST,
            relative_uri: TASK_EXEC_HANDLER,
            body,
            headers,
            created_at,
            schedule_time,
        };

        self.pending.fetch_add(1, Ordering::SeqCst);
        let delivery = Arc::clone(&self.delivery);
        let pending = Arc::clone(&self.pending);
        tokio::spawn(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            match delivery.deliver(&request).await {
                Ok(()) => debug!(task = %request.name, "Task completed"),
                Err(e) => warn!(task = %request.name, error = %e, "Task delivery failed"),
            }
            pending.fetch_sub(1, Ordering::SeqCst);
        });

        info!(
            task = %name,
            module = %payload.module,
            function = %payload.function,
            delay_ms = %delay.map_or(0, |d| d.as_millis()),
            "Created task"
        );
        Ok(name)
    }

    /// Schedule a call to `target` with keyword arguments.
    pub fn defer_execution(
        &self,
        target: TaskTarget,
        kwargs: Map<String, Value>,
        options: &TaskOptions,
    ) -> Result<String, TaskError> {
        self.create_task(&TaskPayload::new(target, kwargs), options)
    }
}
