//! Business layer between the HTTP handlers and the backends.
//!
//! Writes go to the entity store synchronously; the mirror update and the
//! CSV export are deferred through the task queue (see [`jobs`]).

mod error;
pub mod jobs;

pub use error::ServiceError;
pub use jobs::{register_jobs, GENERATE_CSV, UPDATE_REALTIME_DB};

use crate::item::{Item, ItemCreate, ItemDetail, ItemFilters, ItemId};
use crate::metrics::OperationTimer;
use crate::storage::{get_file, Blob, ObjectStore};
use crate::store::EntityStore;
use crate::tasks::{Location, Queue, TaskOptions, TaskQueue};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Delay before a new item is copied to the mirror.
pub const DEFAULT_MIRROR_DELAY: Duration = Duration::from_secs(5);
/// Delay before the CSV export runs after a write.
pub const DEFAULT_EXPORT_DELAY: Duration = Duration::from_secs(10);

/// Scheduling of the post-write tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSettings {
    pub mirror_delay: Duration,
    pub export_delay: Duration,
    pub location: Location,
    pub queue: Queue,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            mirror_delay: DEFAULT_MIRROR_DELAY,
            export_delay: DEFAULT_EXPORT_DELAY,
            location: Location::default(),
            queue: Queue::default(),
        }
    }
}

impl ServiceSettings {
    fn task_options(&self, delay: Duration) -> TaskOptions {
        TaskOptions::delayed(delay)
            .in_location(self.location)
            .on_queue(self.queue)
    }
}

pub struct ItemService {
    store: Arc<dyn EntityStore>,
    objects: Arc<dyn ObjectStore>,
    queue: Arc<TaskQueue>,
    settings: ServiceSettings,
}

impl ItemService {
    #[must_use]
    pub fn new(
        store: Arc<dyn EntityStore>,
        objects: Arc<dyn ObjectStore>,
        queue: Arc<TaskQueue>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            store,
            objects,
            queue,
            settings,
        }
    }

    #[must_use]
    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    #[must_use]
    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Validate and store a new item, then defer the mirror update and the
    /// CSV export.
    pub async fn create_item(&self, request: ItemCreate) -> Result<ItemDetail, ServiceError> {
        let _timer = OperationTimer::new("create_item");
        let fields = request.validate()?;
        let item = Item::new(ItemId::generate(), fields);
        self.store.put(&item).await?;
        info!(item_id = %item.id, name = %item.name, "Created item");

        let mut kwargs = Map::new();
        kwargs.insert("item_id".to_string(), Value::String(item.id.to_string()));
        self.queue.defer_execution(
            UPDATE_REALTIME_DB,
            kwargs,
            &self.settings.task_options(self.settings.mirror_delay),
        )?;
        self.queue.defer_execution(
            GENERATE_CSV,
            Map::new(),
            &self.settings.task_options(self.settings.export_delay),
        )?;

        Ok(ItemDetail::from(item))
    }

    pub async fn get_item(&self, item_id: &ItemId) -> Result<Option<ItemDetail>, ServiceError> {
        let _timer = OperationTimer::new("get_item");
        Ok(self.store.get(item_id).await?.map(ItemDetail::from))
    }

    /// Items matching `filters` (all items when `None`), oldest first.
    pub async fn filter_items(
        &self,
        filters: Option<ItemFilters>,
    ) -> Result<Vec<ItemDetail>, ServiceError> {
        let _timer = OperationTimer::new("filter_items");
        let filters = filters.unwrap_or_default();
        filters.validate()?;
        let items = self.store.query(&filters).await?;
        Ok(items.into_iter().map(ItemDetail::from).collect())
    }

    /// Offers priced in `[min_price, max_price)`.
    pub async fn get_offers_in_price_range(
        &self,
        min_price: Option<f64>,
        max_price: Option<f64>,
    ) -> Result<Vec<ItemDetail>, ServiceError> {
        self.filter_items(Some(ItemFilters::offers(min_price, max_price)))
            .await
    }

    /// Every object in every bucket, as `bucket/object`.
    pub async fn list_all_cloud_storage_files(&self) -> Result<Vec<String>, ServiceError> {
        let _timer = OperationTimer::new("list_all_cloud_storage_files");
        let mut files = Vec::new();
        for bucket in self.objects.list_buckets().await? {
            for blob in self.objects.list_blobs(&bucket.name).await? {
                files.push(format!("{}/{}", bucket.name, blob));
            }
        }
        Ok(files)
    }

    /// Look up an exported file; unknown buckets and missing files are `None`.
    pub async fn get_export_file(
        &self,
        bucket_name: &str,
        filename: &str,
    ) -> Result<Option<Blob>, ServiceError> {
        Ok(get_file(self.objects.as_ref(), bucket_name, filename).await?)
    }

    pub async fn count_items(&self) -> Result<usize, ServiceError> {
        let count = self.store.count().await?;
        info!(count, "Counted items");
        Ok(count)
    }
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod tests;
