//! Real-time mirror: a secondary document database.
//!
//! Documents are JSON objects addressed by `collection/doc_id`. The mirror
//! is only written by deferred tasks, so it trails the entity store.

mod file;
mod memory;

pub use file::FileMirror;
pub use memory::InMemoryMirror;

use crate::utils::is_safe_segment;
use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Collection holding one document per item.
pub const ITEMS_COLLECTION: &str = "items";

/// A mirror document body.
pub type Document = Map<String, Value>;

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Invalid document path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait]
pub trait DocumentMirror: Send + Sync {
    /// Replace the whole document at `collection/doc_id`.
    async fn set(&self, collection: &str, doc_id: &str, document: Document)
        -> Result<(), MirrorError>;

    async fn get(&self, collection: &str, doc_id: &str) -> Result<Option<Document>, MirrorError>;

    /// Document ids in `collection`, sorted.
    async fn list(&self, collection: &str) -> Result<Vec<String>, MirrorError>;
}

pub(crate) fn check_path(collection: &str, doc_id: Option<&str>) -> Result<(), MirrorError> {
    if !is_safe_segment(collection) {
        return Err(MirrorError::InvalidPath(collection.to_string()));
    }
    match doc_id {
        Some(id) if !is_safe_segment(id) => {
            Err(MirrorError::InvalidPath(format!("{collection}/{id}")))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "mirror_tests.rs"]
mod tests;
