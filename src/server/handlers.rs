use super::error::ApiError;
use super::AppState;
use crate::item::{FieldError, ItemCreate, ItemDetail, ItemFilters, ItemId};
use crate::tasks::{exec_task as run_task, validate_task_headers, TaskPayload};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

const EXPORT_DOWNLOAD_NAME: &str = "export.csv";

/// Entry in the `/docs` route index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub summary: &'static str,
}

const fn route(method: &'static str, path: &'static str, summary: &'static str) -> RouteInfo {
    RouteInfo {
        method,
        path,
        summary,
    }
}

/// Routes listed by `/docs`. Internal routes are left out.
pub const PUBLIC_ROUTES: [RouteInfo; 7] = [
    route("GET", "/docs", "This route index"),
    route("POST", "/item", "Create an item"),
    route("GET", "/item/{item_id}", "Get an item by id"),
    route(
        "GET",
        "/items",
        "List items filtered by name_startswith, is_offer, min_price and max_price",
    ),
    route(
        "GET",
        "/items/offers/{min_price}/to/{max_price}",
        "List offers priced in [min_price, max_price)",
    ),
    route("GET", "/gcs-files", "List exported files as bucket/name"),
    route(
        "GET",
        "/gcs-file/{bucket_name}/{filename}",
        "Download an exported CSV file",
    ),
];

// Handlers must be async even when they do not await.
#[allow(clippy::unused_async)]
pub async fn root() -> Redirect {
    Redirect::temporary("/docs")
}

#[allow(clippy::unused_async)]
pub async fn docs() -> Json<Value> {
    Json(json!({
        "title": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "routes": PUBLIC_ROUTES,
    }))
}

pub async fn create_item(
    State(state): State<AppState>,
    request: Result<Json<ItemCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<ItemDetail>), ApiError> {
    let Json(request) = request?;
    let detail = state.service.create_item(request).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<Json<ItemDetail>, ApiError> {
    let item_id: ItemId = item_id.parse().map_err(|e: uuid::Error| {
        ApiError::validation(vec![FieldError::new("item_id", e.to_string())])
    })?;
    state
        .service
        .get_item(&item_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Item not found"))
}

pub async fn list_items(
    State(state): State<AppState>,
    filters: Result<Query<ItemFilters>, QueryRejection>,
) -> Result<Json<Vec<ItemDetail>>, ApiError> {
    let Query(filters) = filters?;
    Ok(Json(state.service.filter_items(Some(filters)).await?))
}

pub async fn list_offers(
    State(state): State<AppState>,
    bounds: Result<Path<(f64, f64)>, PathRejection>,
) -> Result<Json<Vec<ItemDetail>>, ApiError> {
    let Path((min_price, max_price)) = bounds?;
    Ok(Json(
        state
            .service
            .get_offers_in_price_range(Some(min_price), Some(max_price))
            .await?,
    ))
}

pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.service.list_all_cloud_storage_files().await?))
}

pub async fn download_file(
    State(state): State<AppState>,
    Path((bucket_name, filename)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let blob = state
        .service
        .get_export_file(&bucket_name, &filename)
        .await?
        .ok_or_else(|| ApiError::not_found("csv not found"))?;
    Ok((
        [
            (header::CONTENT_TYPE, blob.content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={EXPORT_DOWNLOAD_NAME}"),
            ),
        ],
        blob.data,
    )
        .into_response())
}

pub async fn count_items(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let count = state.service.count_items().await?;
    Ok(Json(json!({ "count": count })))
}

/// Run a task delivered by the queue.
///
/// Queue headers are checked before the body so unauthenticated callers get
/// 403 regardless of what they send.
pub async fn exec_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    validate_task_headers(&headers)?;
    let Json(payload) = payload?;
    let result = run_task(&state.registry, payload, &headers).await?;
    Ok(Json(json!({ "result": result })))
}
