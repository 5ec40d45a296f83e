//! Object storage: named buckets holding blobs.
//!
//! [`ObjectStore`] is the backend seam; [`InMemoryObjectStore`] and
//! [`FsObjectStore`] implement it. The free functions in `helpers` hold the
//! bucket conventions used by the service (known bucket names, CSV export,
//! lenient file lookup).

mod filesystem;
mod helpers;
mod memory;

pub use filesystem::FsObjectStore;
pub use helpers::{get_bucket, get_file, get_or_create_bucket, render_csv, write_csv, CSV_CONTENT_TYPE};
pub use memory::InMemoryObjectStore;

use crate::utils::is_safe_segment;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Unknown bucket name: {0}")]
    UnknownBucket(String),

    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    #[error("Bucket already exists: {0}")]
    BucketAlreadyExists(String),

    #[error("Invalid object or bucket name: {0}")]
    InvalidName(String),

    #[error("Cannot write a CSV file without rows")]
    EmptyRows,

    #[error("CSV row has field '{0}' which is not in the header")]
    UnexpectedField(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Buckets the service knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketName {
    /// Scratch bucket for export artifacts
    TmpFiles,
}

impl BucketName {
    pub const ALL: [BucketName; 1] = [BucketName::TmpFiles];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BucketName::TmpFiles => "tmp_files",
        }
    }
}

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BucketName {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BucketName::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| StorageError::UnknownBucket(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bucket: String,
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
    pub updated: DateTime<Utc>,
}

impl Blob {
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn lookup_bucket(&self, name: &str) -> Result<Option<Bucket>, StorageError>;

    /// Fails with [`StorageError::BucketAlreadyExists`] if the bucket exists.
    async fn create_bucket(&self, name: &str) -> Result<Bucket, StorageError>;

    /// All buckets, sorted by name.
    async fn list_buckets(&self) -> Result<Vec<Bucket>, StorageError>;

    /// Object names in `bucket`, sorted.
    async fn list_blobs(&self, bucket: &str) -> Result<Vec<String>, StorageError>;

    async fn get_blob(&self, bucket: &str, name: &str) -> Result<Option<Blob>, StorageError>;

    /// Create or replace an object in an existing bucket.
    async fn upload(
        &self,
        bucket: &str,
        name: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<Blob, StorageError>;
}

pub(crate) fn check_name(name: &str) -> Result<(), StorageError> {
    if is_safe_segment(name) {
        Ok(())
    } else {
        Err(StorageError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
#[path = "storage_tests.rs"]
mod tests;
