// Allow panic/unwrap/expect in tests (denied globally via Cargo.toml lints)
#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        clippy::indexing_slicing,
        clippy::float_cmp
    )
)]

pub mod app;
pub mod cors;
pub mod environment;
pub mod http_logging;
pub mod item;
pub mod logging;
pub mod metrics;
pub mod mirror;
pub mod server;
pub mod services;
pub mod storage;
pub mod store;
pub mod tasks;
pub mod user_config;
pub mod utils;

// Re-export commonly used types
pub use item::{
    FieldError, Item, ItemCreate, ItemDetail, ItemFilters, ItemId, ValidationError,
};
pub use mirror::{Document, DocumentMirror, FileMirror, InMemoryMirror, MirrorError};
pub use server::{build_router, ApiError, AppState};
pub use services::{ItemService, ServiceError, ServiceSettings};
pub use storage::{Blob, Bucket, BucketName, FsObjectStore, InMemoryObjectStore, ObjectStore, StorageError};
pub use store::{EntityStore, FileEntityStore, InMemoryEntityStore, StoreError};
pub use tasks::{
    exec_task, TaskDelivery, TaskError, TaskHandler, TaskPayload, TaskQueue, TaskRegistry,
    TASK_EXEC_HANDLER,
};
