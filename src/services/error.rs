use crate::item::ValidationError;
use crate::mirror::MirrorError;
use crate::storage::StorageError;
use crate::store::StoreError;
use crate::tasks::TaskError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Entity store error: {0}")]
    Store(#[from] StoreError),

    #[error("Mirror error: {0}")]
    Mirror(#[from] MirrorError),

    #[error("Object storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Task error: {0}")]
    Task(#[from] TaskError),
}
