//! HTTP facade over [`ItemService`].

mod error;
mod handlers;

pub use error::{ApiError, ErrorDetail};
pub use handlers::{PUBLIC_ROUTES, RouteInfo};

use crate::services::ItemService;
use crate::tasks::{TaskRegistry, TASK_EXEC_HANDLER};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ItemService>,
    pub registry: Arc<TaskRegistry>,
}

impl AppState {
    #[must_use]
    pub fn new(service: Arc<ItemService>, registry: Arc<TaskRegistry>) -> Self {
        Self { service, registry }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/docs", get(handlers::docs))
        .route("/item", post(handlers::create_item))
        .route("/item/{item_id}", get(handlers::get_item))
        .route("/items", get(handlers::list_items))
        .route(
            "/items/offers/{min_price}/to/{max_price}",
            get(handlers::list_offers),
        )
        .route("/gcs-files", get(handlers::list_files))
        .route("/gcs-file/{bucket_name}/{filename}", get(handlers::download_file))
        .route("/_internal/items/count", get(handlers::count_items))
        .route(TASK_EXEC_HANDLER, post(handlers::exec_task))
        .with_state(state)
}
