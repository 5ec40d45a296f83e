use super::*;
use async_trait::async_trait;
use http::{HeaderMap, HeaderValue};
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const ECHO: TaskTarget = TaskTarget::new("tests", "echo");

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<Map<String, Value>>>,
}

impl Recorder {
    fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TaskHandler for Recorder {
    async fn run(&self, kwargs: Map<String, Value>) -> Result<Value, TaskError> {
        self.calls.lock().unwrap().push(kwargs.clone());
        Ok(Value::Object(kwargs))
    }
}

struct Failing;

#[async_trait]
impl TaskHandler for Failing {
    async fn run(&self, _kwargs: Map<String, Value>) -> Result<Value, TaskError> {
        Err(TaskError::handler("boom"))
    }
}

fn registry_with(recorder: &Arc<Recorder>) -> TaskRegistry {
    let mut registry = TaskRegistry::new();
    registry.register(ECHO, Arc::clone(recorder) as Arc<dyn TaskHandler>);
    registry.register(TaskTarget::new("tests", "fail"), Arc::new(Failing));
    registry
}

fn full_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in GCP_TASK_HEADERS {
        headers.insert(
            http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_static("x"),
        );
    }
    headers
}

fn kwargs(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

#[test]
fn test_queue_path() {
    assert_eq!(
        queue_path("demo", Location::default(), Queue::default()),
        "projects/demo/locations/us-central1/queues/default"
    );
    assert_eq!(
        queue_path("demo", Location::UsEast1, Queue::Default),
        "projects/demo/locations/us-east1/queues/default"
    );
}

#[test]
fn test_payload_defaults() {
    let payload: TaskPayload =
        serde_json::from_str(r#"{"module": "services", "function": "generate_csv"}"#).unwrap();
    assert!(payload.args.is_empty());
    assert!(payload.kwargs.is_empty());
}

#[test]
fn test_payload_wire_shape() {
    let payload = TaskPayload::new(ECHO, kwargs(json!({"item_id": "abc"})));
    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(
        value,
        json!({"module": "tests", "function": "echo", "args": [], "kwargs": {"item_id": "abc"}})
    );
}

#[test]
fn test_validate_headers_requires_all() {
    assert!(validate_task_headers(&full_headers()).is_ok());

    let mut headers = full_headers();
    headers.remove("x-appengine-tasketa");
    let err = validate_task_headers(&headers).unwrap_err();
    assert!(matches!(err, TaskError::InvalidRequest(h) if h == "X-AppEngine-TaskETA"));

    assert!(validate_task_headers(&HeaderMap::new()).is_err());
}

#[tokio::test]
async fn test_exec_task_dispatches_kwargs() {
    let recorder = Arc::new(Recorder::default());
    let registry = registry_with(&recorder);
    let payload = TaskPayload::new(ECHO, kwargs(json!({"n": 1})));

    let result = exec_task(&registry, payload, &full_headers()).await.unwrap();

    assert_eq!(result, json!({"n": 1}));
    assert_eq!(recorder.count(), 1);
}

#[tokio::test]
async fn test_exec_task_rejects_missing_headers_before_dispatch() {
    let recorder = Arc::new(Recorder::default());
    let registry = registry_with(&recorder);
    let payload = TaskPayload::new(ECHO, Map::new());

    let err = exec_task(&registry, payload, &HeaderMap::new()).await.unwrap_err();

    assert!(matches!(err, TaskError::InvalidRequest(_)));
    assert_eq!(recorder.count(), 0);
}

#[tokio::test]
async fn test_exec_task_unknown_function() {
    let registry = TaskRegistry::new();
    let payload = TaskPayload::new(TaskTarget::new("os", "system"), Map::new());
    let err = exec_task(&registry, payload, &full_headers()).await.unwrap_err();
    assert!(matches!(err, TaskError::UnknownFunction { .. }));
}

#[tokio::test]
async fn test_exec_task_rejects_positional_args() {
    let recorder = Arc::new(Recorder::default());
    let registry = registry_with(&recorder);
    let mut payload = TaskPayload::new(ECHO, Map::new());
    payload.args.push(json!(1));
    let err = exec_task(&registry, payload, &full_headers()).await.unwrap_err();
    assert!(matches!(err, TaskError::InvalidArguments(_)));
}

#[test]
fn test_registry_names_sorted() {
    let recorder = Arc::new(Recorder::default());
    assert_eq!(registry_with(&recorder).names(), vec!["tests.echo", "tests.fail"]);
}

#[test]
fn test_kwarg_helpers() {
    let args = kwargs(json!({"item_id": "abc", "count": 2}));
    assert!(check_kwargs(&args, &["item_id", "count"]).is_ok());
    assert!(matches!(
        check_kwargs(&args, &["item_id"]),
        Err(TaskError::InvalidArguments(_))
    ));

    let count: u32 = required_kwarg(&args, "count").unwrap();
    assert_eq!(count, 2);
    assert!(required_kwarg::<u32>(&args, "missing").is_err());
    assert!(required_kwarg::<u32>(&args, "item_id").is_err());
}

#[tokio::test(start_paused = true)]
async fn test_queue_delivers_after_delay() {
    let recorder = Arc::new(Recorder::default());
    let registry = Arc::new(registry_with(&recorder));
    let queue = TaskQueue::new("test-project", Arc::new(LocalDelivery::new(registry)));

    let name = queue
        .defer_execution(
            ECHO,
            kwargs(json!({"item_id": "abc"})),
            &TaskOptions::delayed(Duration::from_secs(5)),
        )
        .unwrap();

    assert!(name.starts_with("projects/test-project/locations/us-central1/queues/default/tasks/"));
    assert_eq!(queue.pending(), 1);

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(recorder.count(), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(recorder.count(), 1);
    assert_eq!(queue.pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_queue_failed_delivery_is_dropped() {
    let recorder = Arc::new(Recorder::default());
    let registry = Arc::new(registry_with(&recorder));
    let queue = TaskQueue::new("p", Arc::new(LocalDelivery::new(registry)));

    queue
        .defer_execution(TaskTarget::new("tests", "fail"), Map::new(), &TaskOptions::default())
        .unwrap();
    queue
        .defer_execution(TaskTarget::new("tests", "missing"), Map::new(), &TaskOptions::default())
        .unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(queue.pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_drain_waits_for_due_tasks() {
    let recorder = Arc::new(Recorder::default());
    let registry = Arc::new(registry_with(&recorder));
    let queue = TaskQueue::new("p", Arc::new(LocalDelivery::new(registry)));

    queue
        .defer_execution(ECHO, Map::new(), &TaskOptions::delayed(Duration::from_secs(5)))
        .unwrap();

    assert_eq!(queue.drain(Duration::from_secs(10)).await, 0);
    assert_eq!(recorder.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_drain_reports_abandoned_tasks() {
    let recorder = Arc::new(Recorder::default());
    let registry = Arc::new(registry_with(&recorder));
    let queue = TaskQueue::new("p", Arc::new(LocalDelivery::new(registry)));

    queue
        .defer_execution(ECHO, Map::new(), &TaskOptions::delayed(Duration::from_secs(5)))
        .unwrap();
    queue
        .defer_execution(ECHO, Map::new(), &TaskOptions::delayed(Duration::from_secs(60)))
        .unwrap();

    assert_eq!(queue.drain(Duration::from_secs(10)).await, 1);
    assert_eq!(recorder.count(), 1);
}

#[tokio::test]
async fn test_drain_without_tasks_returns_immediately() {
    let recorder = Arc::new(Recorder::default());
    let queue = TaskQueue::new("p", Arc::new(LocalDelivery::new(Arc::new(registry_with(&recorder)))));
    assert_eq!(queue.drain(Duration::from_secs(3600)).await, 0);
}

#[test]
fn test_queue_headers_are_complete() {
    let request = TaskRequest {
        name: "projects/p/locations/us-central1/queues/default/tasks/t1".to_string(),
        task_id: "t1".to_string(),
        queue: Queue::Default,
        http_method: http::Method::POST,
        relative_uri: TASK_EXEC_HANDLER,
        body: bytes::Bytes::new(),
        headers: HeaderMap::new(),
        created_at: chrono::Utc::now(),
        schedule_time: None,
    };
    let headers = queue_headers(&request);
    assert!(validate_task_headers(&headers).is_ok());
    assert_eq!(headers.get("X-AppEngine-QueueName").unwrap(), "default");
    assert_eq!(headers.get("X-AppEngine-TaskName").unwrap(), "t1");
    assert_eq!(headers.get("X-AppEngine-TaskRetryCount").unwrap(), "0");
}
