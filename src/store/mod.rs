//! Primary entity store for items.
//!
//! The store is schema-on-read: it persists whole [`Item`] records keyed by
//! id and evaluates [`ItemFilters`] itself. Two backends are provided:
//! [`InMemoryEntityStore`] for tests and ephemeral runs, and
//! [`FileEntityStore`], a single JSON document on disk.

mod file;
mod memory;

pub use file::{FileEntityStore, ITEMS_FILE};
pub use memory::InMemoryEntityStore;

use crate::item::{Item, ItemFilters, ItemId};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported store schema version {found} (max supported {supported})")]
    UnsupportedSchema { found: u32, supported: u32 },
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Insert or overwrite the item with `item.id`.
    async fn put(&self, item: &Item) -> Result<(), StoreError>;

    async fn get(&self, id: &ItemId) -> Result<Option<Item>, StoreError>;

    /// Items matching `filters`, oldest first.
    async fn query(&self, filters: &ItemFilters) -> Result<Vec<Item>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}

/// Order query results by creation time, then id.
pub(crate) fn sort_items(items: &mut [Item]) {
    items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
