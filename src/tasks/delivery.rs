use super::error::TaskError;
use super::payload::TaskPayload;
use super::queue::TaskRequest;
use super::registry::{exec_task, TaskRegistry};
use async_trait::async_trait;
use chrono::Utc;
use http::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use tracing::debug;

/// Hands a due task to whatever executes it.
#[async_trait]
pub trait TaskDelivery: Send + Sync {
    async fn deliver(&self, request: &TaskRequest) -> Result<(), TaskError>;
}

/// Headers for a delivery: the request's own headers plus the queue
/// headers listed in [`super::GCP_TASK_HEADERS`].
///
/// Tasks are delivered once, so retry count and execution count are 0.
/// The ETA is the schedule time (or creation time) in fractional seconds
/// since the epoch.
#[must_use]
pub fn queue_headers(request: &TaskRequest) -> HeaderMap {
    let mut headers = request.headers.clone();
    let eta = request.schedule_time.unwrap_or(request.created_at);
    let eta = format!(
        "{}.{:06}",
        eta.timestamp(),
        eta.timestamp_subsec_micros()
    );
    let values = [
        ("x-appengine-queuename", request.queue.as_str().to_string()),
        ("x-appengine-taskname", request.task_id.clone()),
        ("x-appengine-taskretrycount", "0".to_string()),
        ("x-appengine-taskexecutioncount", "0".to_string()),
        ("x-appengine-tasketa", eta),
    ];
    for (name, value) in values {
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(HeaderName::from_static(name), value);
        }
    }
    headers
}

/// Runs tasks inside this process against a [`TaskRegistry`].
#[derive(Clone)]
pub struct LocalDelivery {
    registry: Arc<TaskRegistry>,
}

impl LocalDelivery {
    #[must_use]
    pub fn new(registry: Arc<TaskRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl TaskDelivery for LocalDelivery {
    async fn deliver(&self, request: &TaskRequest) -> Result<(), TaskError> {
        let payload: TaskPayload = serde_json::from_slice(&request.body)?;
        let headers = queue_headers(request);
        let started = Utc::now();
        let result = exec_task(&self.registry, payload, &headers).await?;
        debug!(
            task = %request.name,
            duration_ms = (Utc::now() - started).num_milliseconds(),
            result = %result,
            "Task delivered in-process"
        );
        Ok(())
    }
}

/// POSTs tasks to `{target_url}{relative_uri}` on a running service.
#[derive(Clone)]
pub struct HttpDelivery {
    client: reqwest::Client,
    target_url: String,
}

impl HttpDelivery {
    #[must_use]
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            target_url: target_url.into().trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn target_url(&self) -> &str {
        &self.target_url
    }
}

#[async_trait]
impl TaskDelivery for HttpDelivery {
    async fn deliver(&self, request: &TaskRequest) -> Result<(), TaskError> {
        let url = format!("{}{}", self.target_url, request.relative_uri);
        let response = self
            .client
            .request(request.http_method.clone(), &url)
            .headers(queue_headers(request))
            .body(request.body.clone())
            .send()
            .await
            .map_err(|e| TaskError::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TaskError::Delivery(format!("{url} returned {status}: {body}")));
        }
        debug!(task = %request.name, url = %url, status = %status, "Task delivered over HTTP");
        Ok(())
    }
}
