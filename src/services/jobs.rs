//! Post-write jobs run through the task queue.

use super::ServiceError;
use crate::item::{Item, ItemFilters, ItemId};
use crate::mirror::{DocumentMirror, ITEMS_COLLECTION};
use crate::storage::{write_csv, BucketName, ObjectStore};
use crate::store::EntityStore;
use crate::tasks::{check_kwargs, required_kwarg, TaskError, TaskHandler, TaskRegistry, TaskTarget};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

pub const JOBS_MODULE: &str = "services";
pub const UPDATE_REALTIME_DB: TaskTarget = TaskTarget::new(JOBS_MODULE, "update_realtime_db");
pub const GENERATE_CSV: TaskTarget = TaskTarget::new(JOBS_MODULE, "generate_csv");

/// Copy the stored item to its mirror document `items/{id}`.
pub async fn update_realtime_db(
    store: &dyn EntityStore,
    mirror: &dyn DocumentMirror,
    item_id: &ItemId,
) -> Result<(), ServiceError> {
    let item = store
        .get(item_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(item_id.to_string()))?;
    mirror
        .set(ITEMS_COLLECTION, &item_id.to_string(), item.to_record())
        .await?;
    info!(item_id = %item_id, "Updated mirror document");
    Ok(())
}

/// Name of the export file written at `now`.
#[must_use]
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("items-{}.csv", now.format("%Y-%m-%d %H:%M:%S%.6f"))
}

/// Export every item as one CSV file into the `tmp_files` bucket.
///
/// Returns the file name, or `None` when there are no items to export.
pub async fn generate_csv(
    store: &dyn EntityStore,
    objects: &dyn ObjectStore,
    now: DateTime<Utc>,
) -> Result<Option<String>, ServiceError> {
    let items = store.query(&ItemFilters::new()).await?;
    if items.is_empty() {
        debug!("No items to export");
        return Ok(None);
    }
    let rows: Vec<Map<String, Value>> = items.iter().map(Item::to_record).collect();
    let filename = export_filename(now);
    write_csv(objects, BucketName::TmpFiles, &filename, &rows).await?;
    Ok(Some(filename))
}

struct MirrorSyncJob {
    store: Arc<dyn EntityStore>,
    mirror: Arc<dyn DocumentMirror>,
}

#[async_trait]
impl TaskHandler for MirrorSyncJob {
    async fn run(&self, kwargs: Map<String, Value>) -> Result<Value, TaskError> {
        check_kwargs(&kwargs, &["item_id"])?;
        let item_id: ItemId = required_kwarg(&kwargs, "item_id")?;
        update_realtime_db(self.store.as_ref(), self.mirror.as_ref(), &item_id)
            .await
            .map_err(|e| TaskError::handler(e.to_string()))?;
        Ok(json!({ "item_id": item_id }))
    }
}

struct CsvExportJob {
    store: Arc<dyn EntityStore>,
    objects: Arc<dyn ObjectStore>,
}

#[async_trait]
impl TaskHandler for CsvExportJob {
    async fn run(&self, kwargs: Map<String, Value>) -> Result<Value, TaskError> {
        check_kwargs(&kwargs, &[])?;
        let filename = generate_csv(self.store.as_ref(), self.objects.as_ref(), Utc::now())
            .await
            .map_err(|e| TaskError::handler(e.to_string()))?;
        Ok(json!({ "filename": filename }))
    }
}

/// Register the post-write jobs under [`UPDATE_REALTIME_DB`] and
/// [`GENERATE_CSV`].
pub fn register_jobs(
    registry: &mut TaskRegistry,
    store: &Arc<dyn EntityStore>,
    mirror: &Arc<dyn DocumentMirror>,
    objects: &Arc<dyn ObjectStore>,
) {
    registry.register(
        UPDATE_REALTIME_DB,
        Arc::new(MirrorSyncJob {
            store: Arc::clone(store),
            mirror: Arc::clone(mirror),
        }),
    );
    registry.register(
        GENERATE_CSV,
        Arc::new(CsvExportJob {
            store: Arc::clone(store),
            objects: Arc::clone(objects),
        }),
    );
}
