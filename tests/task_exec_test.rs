#![allow(clippy::indexing_slicing)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_json, memory_app, post_json, send};
use item_service::mirror::{DocumentMirror, ITEMS_COLLECTION};
use item_service::storage::ObjectStore;
use item_service::tasks::GCP_TASK_HEADERS;
use item_service::{ItemCreate, TASK_EXEC_HANDLER};
use serde_json::{json, Value};

fn task_request(body: &Value) -> Request<Body> {
    let mut builder = Request::post(TASK_EXEC_HANDLER).header("content-type", "application/json");
    for name in GCP_TASK_HEADERS {
        builder = builder.header(name, "1");
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_missing_queue_headers_forbidden() {
    let (app, _, _) = memory_app();
    let response = send(
        &app,
        post_json(
            TASK_EXEC_HANDLER,
            &json!({ "module": "services", "function": "generate_csv" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_headers_checked_before_body() {
    let (app, _, _) = memory_app();
    let request = Request::post(TASK_EXEC_HANDLER)
        .header("content-type", "application/json")
        .body(Body::from("garbage"))
        .unwrap();
    assert_eq!(send(&app, request).await.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_function_not_found() {
    let (app, _, _) = memory_app();
    let response = send(
        &app,
        task_request(&json!({ "module": "services", "function": "drop_tables" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bad_arguments_unprocessable() {
    let (app, _, _) = memory_app();
    for body in [
        json!({ "module": "services", "function": "generate_csv", "args": [1] }),
        json!({ "module": "services", "function": "generate_csv", "kwargs": { "x": 1 } }),
        json!({ "module": "services", "function": "update_realtime_db", "kwargs": {} }),
    ] {
        let response = send(&app, task_request(&body)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{body}");
    }
}

#[tokio::test]
async fn test_update_realtime_db_via_endpoint() {
    let (app, state, backends) = memory_app();
    let item = state
        .service
        .create_item(ItemCreate::new("Rug", 40.0))
        .await
        .unwrap();

    let response = send(
        &app,
        task_request(&json!({
            "module": "services",
            "function": "update_realtime_db",
            "kwargs": { "item_id": item.id.to_string() },
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let doc = backends
        .mirror
        .get(ITEMS_COLLECTION, &item.id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc["name"], "Rug");
    assert_eq!(doc["id"], item.id.to_string());
}

#[tokio::test]
async fn test_generate_csv_via_endpoint() {
    let (app, state, backends) = memory_app();
    state
        .service
        .create_item(ItemCreate::new("Vase", 12.0))
        .await
        .unwrap();

    let response = send(
        &app,
        task_request(&json!({ "module": "services", "function": "generate_csv" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let filename = body["result"]["filename"].as_str().unwrap();
    assert!(filename.starts_with("items-"));

    let blobs = backends.objects.list_blobs("tmp_files").await.unwrap();
    assert_eq!(blobs, vec![filename.to_string()]);
}

#[tokio::test]
async fn test_update_missing_item_is_internal_error() {
    let (app, _, _) = memory_app();
    let response = send(
        &app,
        task_request(&json!({
            "module": "services",
            "function": "update_realtime_db",
            "kwargs": { "item_id": "6f1c0b7e-3a43-4c41-9a8f-0d2f3c9b1a11" },
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "detail": "An internal error occurred" })
    );
}
