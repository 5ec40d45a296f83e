use super::{sort_items, EntityStore, StoreError};
use crate::item::{Item, ItemFilters, ItemId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Entity store kept in process memory. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEntityStore {
    items: Arc<RwLock<HashMap<ItemId, Item>>>,
}

impl InMemoryEntityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn put(&self, item: &Item) -> Result<(), StoreError> {
        self.items.write().await.insert(item.id, item.clone());
        Ok(())
    }

    async fn get(&self, id: &ItemId) -> Result<Option<Item>, StoreError> {
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn query(&self, filters: &ItemFilters) -> Result<Vec<Item>, StoreError> {
        let mut matched: Vec<Item> = self
            .items
            .read()
            .await
            .values()
            .filter(|item| filters.matches(item))
            .cloned()
            .collect();
        sort_items(&mut matched);
        Ok(matched)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.items.read().await.len())
    }
}
