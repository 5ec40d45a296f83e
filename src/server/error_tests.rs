use super::*;
use crate::item::ValidationError;
use http_body_util::BodyExt;
use serde_json::{json, Value};

async fn body_json(error: ApiError) -> (StatusCode, Value) {
    let response = error.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_not_found_body() {
    let (status, body) = body_json(ApiError::not_found("Item not found")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Item not found" }));
}

#[tokio::test]
async fn test_validation_lists_fields() {
    let err: ApiError = ValidationError::single("price", "must be greater than 0").into();
    let (status, body) = body_json(err).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        json!({ "detail": [{ "field": "price", "message": "must be greater than 0" }] })
    );
}

#[test]
fn test_service_not_found_maps_to_404() {
    let err = ApiError::from(ServiceError::NotFound("abc".to_string()));
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_internal_errors_are_hidden() {
    let source = std::io::Error::other("disk on fire");
    let err = ApiError::from(ServiceError::Store(crate::store::StoreError::Io(source)));
    let (status, body) = body_json(err).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "detail": "An internal error occurred" }));
}

#[test]
fn test_task_errors_status() {
    let cases = [
        (
            TaskError::InvalidRequest("x-appengine-queuename".to_string()),
            StatusCode::FORBIDDEN,
        ),
        (
            TaskError::UnknownFunction {
                module: "services".to_string(),
                function: "nope".to_string(),
            },
            StatusCode::NOT_FOUND,
        ),
        (
            TaskError::invalid_arguments("bad"),
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        (
            TaskError::handler("boom"),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];
    for (error, expected) in cases {
        assert_eq!(ApiError::from(error).status, expected);
    }
}

#[test]
fn test_service_task_error_keeps_task_status() {
    let err = ApiError::from(ServiceError::Task(TaskError::Delivery("down".to_string())));
    assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
}
