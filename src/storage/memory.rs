use super::{check_name, Blob, Bucket, ObjectStore, StorageError};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct MemoryBucket {
    bucket: Bucket,
    blobs: BTreeMap<String, Blob>,
}

/// Object store kept in process memory. Clones share the same buckets.
#[derive(Debug, Clone, Default)]
pub struct InMemoryObjectStore {
    buckets: Arc<RwLock<BTreeMap<String, MemoryBucket>>>,
}

impl InMemoryObjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn lookup_bucket(&self, name: &str) -> Result<Option<Bucket>, StorageError> {
        check_name(name)?;
        Ok(self
            .buckets
            .read()
            .await
            .get(name)
            .map(|b| b.bucket.clone()))
    }

    async fn create_bucket(&self, name: &str) -> Result<Bucket, StorageError> {
        check_name(name)?;
        let mut buckets = self.buckets.write().await;
        if buckets.contains_key(name) {
            return Err(StorageError::BucketAlreadyExists(name.to_string()));
        }
        let bucket = Bucket {
            name: name.to_string(),
            created: Utc::now(),
        };
        buckets.insert(
            name.to_string(),
            MemoryBucket {
                bucket: bucket.clone(),
                blobs: BTreeMap::new(),
            },
        );
        Ok(bucket)
    }

    async fn list_buckets(&self) -> Result<Vec<Bucket>, StorageError> {
        Ok(self
            .buckets
            .read()
            .await
            .values()
            .map(|b| b.bucket.clone())
            .collect())
    }

    async fn list_blobs(&self, bucket: &str) -> Result<Vec<String>, StorageError> {
        check_name(bucket)?;
        self.buckets
            .read()
            .await
            .get(bucket)
            .map(|b| b.blobs.keys().cloned().collect())
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))
    }

    async fn get_blob(&self, bucket: &str, name: &str) -> Result<Option<Blob>, StorageError> {
        check_name(bucket)?;
        check_name(name)?;
        Ok(self
            .buckets
            .read()
            .await
            .get(bucket)
            .and_then(|b| b.blobs.get(name))
            .cloned())
    }

    async fn upload(
        &self,
        bucket: &str,
        name: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<Blob, StorageError> {
        check_name(bucket)?;
        check_name(name)?;
        let mut buckets = self.buckets.write().await;
        let target = buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))?;
        let blob = Blob {
            bucket: bucket.to_string(),
            name: name.to_string(),
            content_type: content_type.to_string(),
            data,
            updated: Utc::now(),
        };
        target.blobs.insert(name.to_string(), blob.clone());
        Ok(blob)
    }
}
