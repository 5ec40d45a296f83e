use super::{Blob, Bucket, BucketName, ObjectStore, StorageError};
use bytes::Bytes;
use serde_json::{Map, Value};
use std::str::FromStr;
use tracing::{debug, info};

pub const CSV_CONTENT_TYPE: &str = "text/csv";

pub async fn get_bucket(
    store: &dyn ObjectStore,
    bucket_name: BucketName,
) -> Result<Option<Bucket>, StorageError> {
    store.lookup_bucket(bucket_name.as_str()).await
}

/// Look up a known bucket, creating it on first use.
pub async fn get_or_create_bucket(
    store: &dyn ObjectStore,
    bucket_name: BucketName,
) -> Result<Bucket, StorageError> {
    if let Some(bucket) = get_bucket(store, bucket_name).await? {
        return Ok(bucket);
    }
    match store.create_bucket(bucket_name.as_str()).await {
        Ok(bucket) => {
            info!(bucket = %bucket_name, "Created bucket");
            Ok(bucket)
        }
        // lost a creation race with a concurrent writer
        Err(StorageError::BucketAlreadyExists(_)) => get_bucket(store, bucket_name)
            .await?
            .ok_or_else(|| StorageError::BucketNotFound(bucket_name.to_string())),
        Err(e) => Err(e),
    }
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render rows as CSV text with a header line.
///
/// The header is the key set of the first row, in insertion order. A key
/// missing from a later row renders as an empty cell; a key not in the
/// header is an error.
pub fn render_csv(rows: &[Map<String, Value>]) -> Result<Vec<u8>, StorageError> {
    let header: Vec<&String> = rows.first().ok_or(StorageError::EmptyRows)?.keys().collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header.iter().map(|h| h.as_str()))?;
    for row in rows {
        if let Some(extra) = row.keys().find(|k| !header.contains(k)) {
            return Err(StorageError::UnexpectedField(extra.clone()));
        }
        writer.write_record(
            header
                .iter()
                .map(|h| row.get(h.as_str()).map_or_else(String::new, render_cell)),
        )?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| StorageError::Io(std::io::Error::new(e.error().kind(), e.error().to_string())))
}

/// Write `rows` as a CSV object into a known bucket, creating the bucket if
/// needed.
pub async fn write_csv(
    store: &dyn ObjectStore,
    bucket_name: BucketName,
    filename: &str,
    rows: &[Map<String, Value>],
) -> Result<Blob, StorageError> {
    let content = render_csv(rows)?;
    let bucket = get_or_create_bucket(store, bucket_name).await?;
    let blob = store
        .upload(&bucket.name, filename, Bytes::from(content), CSV_CONTENT_TYPE)
        .await?;
    info!(
        bucket = %bucket.name,
        filename = %filename,
        rows = rows.len(),
        bytes = blob.size(),
        "Wrote CSV export"
    );
    Ok(blob)
}

/// Fetch an object by bucket name string.
///
/// An unknown bucket name, a bucket that does not exist yet, or a missing
/// object all yield `Ok(None)`.
pub async fn get_file(
    store: &dyn ObjectStore,
    bucket_name: &str,
    filename: &str,
) -> Result<Option<Blob>, StorageError> {
    let Ok(bucket_name) = BucketName::from_str(bucket_name) else {
        debug!(bucket = %bucket_name, "Rejected lookup in unknown bucket");
        return Ok(None);
    };
    if get_bucket(store, bucket_name).await?.is_none() {
        return Ok(None);
    }
    match store.get_blob(bucket_name.as_str(), filename).await {
        Err(StorageError::InvalidName(_)) => Ok(None),
        other => other,
    }
}
