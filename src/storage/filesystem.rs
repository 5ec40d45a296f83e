use super::{check_name, Blob, Bucket, ObjectStore, StorageError};
use crate::utils::atomic_write;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

const BUCKET_FILE: &str = "bucket.json";
const OBJECTS_DIR: &str = "objects";
const META_DIR: &str = "meta";

#[derive(Debug, Serialize, Deserialize)]
struct BlobMeta {
    content_type: String,
    updated: DateTime<Utc>,
}

/// Object store laid out on disk:
///
/// ```text
/// <root>/<bucket>/bucket.json
/// <root>/<bucket>/objects/<name>
/// <root>/<bucket>/meta/<name>.json
/// ```
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn bucket_dir(&self, bucket: &str) -> PathBuf {
        self.root.join(bucket)
    }

    fn meta_path(&self, bucket: &str, name: &str) -> PathBuf {
        self.bucket_dir(bucket)
            .join(META_DIR)
            .join(format!("{name}.json"))
    }

    async fn read_bucket(&self, name: &str) -> Result<Option<Bucket>, StorageError> {
        match fs::read_to_string(self.bucket_dir(name).join(BUCKET_FILE)).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn require_bucket(&self, name: &str) -> Result<(), StorageError> {
        match self.read_bucket(name).await? {
            Some(_) => Ok(()),
            None => Err(StorageError::BucketNotFound(name.to_string())),
        }
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn lookup_bucket(&self, name: &str) -> Result<Option<Bucket>, StorageError> {
        check_name(name)?;
        self.read_bucket(name).await
    }

    async fn create_bucket(&self, name: &str) -> Result<Bucket, StorageError> {
        check_name(name)?;
        if self.read_bucket(name).await?.is_some() {
            return Err(StorageError::BucketAlreadyExists(name.to_string()));
        }
        let dir = self.bucket_dir(name);
        fs::create_dir_all(dir.join(OBJECTS_DIR)).await?;
        fs::create_dir_all(dir.join(META_DIR)).await?;
        let bucket = Bucket {
            name: name.to_string(),
            created: Utc::now(),
        };
        atomic_write(&dir.join(BUCKET_FILE), &serde_json::to_vec_pretty(&bucket)?).await?;
        Ok(bucket)
    }

    async fn list_buckets(&self) -> Result<Vec<Bucket>, StorageError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut buckets = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(bucket) = self.read_bucket(&name).await? {
                buckets.push(bucket);
            }
        }
        buckets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(buckets)
    }

    async fn list_blobs(&self, bucket: &str) -> Result<Vec<String>, StorageError> {
        check_name(bucket)?;
        self.require_bucket(bucket).await?;
        let mut entries = fs::read_dir(self.bucket_dir(bucket).join(OBJECTS_DIR)).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            // in-flight temp files from atomic_write have no metadata yet
            if self.meta_path(bucket, &name).exists() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    async fn get_blob(&self, bucket: &str, name: &str) -> Result<Option<Blob>, StorageError> {
        check_name(bucket)?;
        check_name(name)?;
        let meta: BlobMeta = match fs::read_to_string(self.meta_path(bucket, name)).await {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let data = match fs::read(self.bucket_dir(bucket).join(OBJECTS_DIR).join(name)).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(Blob {
            bucket: bucket.to_string(),
            name: name.to_string(),
            content_type: meta.content_type,
            data: Bytes::from(data),
            updated: meta.updated,
        }))
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
        self.require_bucket(bucket).await?;
        let meta = BlobMeta {
            content_type: content_type.to_string(),
            updated: Utc::now(),
        };
        let object_path = self.bucket_dir(bucket).join(OBJECTS_DIR).join(name);
        atomic_write(&object_path, &data).await?;
        atomic_write(&self.meta_path(bucket, name), &serde_json::to_vec_pretty(&meta)?).await?;
        Ok(Blob {
            bucket: bucket.to_string(),
            name: name.to_string(),
            content_type: meta.content_type,
            data,
            updated: meta.updated,
        })
    }
}
