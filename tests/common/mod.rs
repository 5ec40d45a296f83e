//! Common test utilities

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use item_service::app::{build_state, Backends};
use item_service::server::build_router;
use item_service::{AppState, ServiceSettings};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Create a temporary directory for testing
#[allow(dead_code)] // Test utility for integration tests
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Handler state over in-memory backends with in-process task delivery.
pub fn memory_state() -> (AppState, Backends) {
    let backends = Backends::in_memory();
    let state = build_state(&backends, ServiceSettings::default(), "test-project", None);
    (state, backends)
}

pub fn memory_app() -> (Router, AppState, Backends) {
    let (state, backends) = memory_state();
    (build_router(state.clone()), state, backends)
}

/// Send one request through the router.
pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone()
        .oneshot(request)
        .await
        .expect("router is infallible")
}

#[allow(dead_code)] // Test utility for integration tests
pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("valid request")
}

#[allow(dead_code)] // Test utility for integration tests
pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("readable body")
        .to_bytes()
        .to_vec()
}

#[allow(dead_code)] // Test utility for integration tests
pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("JSON body")
}
