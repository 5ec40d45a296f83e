use super::{sort_items, EntityStore, StoreError};
use crate::item::{Item, ItemFilters, ItemId};
use crate::utils::atomic_write;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

/// File name of the item document inside the data directory.
pub const ITEMS_FILE: &str = "items.json";

const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ItemsDocument {
    schema_version: u32,
    #[serde(default)]
    items: BTreeMap<ItemId, Item>,
}

impl ItemsDocument {
    fn new() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            items: BTreeMap::new(),
        }
    }
}

/// Entity store persisted as one JSON document (`<data_dir>/items.json`).
///
/// Writes are serialized through a store-wide lock and replace the file
/// atomically. A missing file reads as an empty store.
#[derive(Debug)]
pub struct FileEntityStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileEntityStore {
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(ITEMS_FILE),
            lock: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<ItemsDocument, StoreError> {
        if !self.path.exists() {
            return Ok(ItemsDocument::new());
        }
        let content = fs::read_to_string(&self.path).await?;
        let document: ItemsDocument = serde_json::from_str(&content)?;
        if document.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(StoreError::UnsupportedSchema {
                found: document.schema_version,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }
        Ok(document)
    }

    async fn write_document(&self, document: &ItemsDocument) -> Result<(), StoreError> {
        let content = serde_json::to_vec_pretty(document)?;
        atomic_write(&self.path, &content).await?;
        Ok(())
    }
}

#[async_trait]
impl EntityStore for FileEntityStore {
    async fn put(&self, item: &Item) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        document.items.insert(item.id, item.clone());
        self.write_document(&document).await?;
        debug!(item_id = %item.id, path = %self.path.display(), "Stored item");
        Ok(())
    }

    async fn get(&self, id: &ItemId) -> Result<Option<Item>, StoreError> {
        let mut document = self.read_document().await?;
        Ok(document.items.remove(id))
    }

    async fn query(&self, filters: &ItemFilters) -> Result<Vec<Item>, StoreError> {
        let document = self.read_document().await?;
        let mut matched: Vec<Item> = document
            .items
            .into_values()
            .filter(|item| filters.matches(item))
            .collect();
        sort_items(&mut matched);
        Ok(matched)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.read_document().await?.items.len())
    }
}
