//! Atomic file writes for the filesystem-backed stores.
//!
//! Every backend that persists to disk (entity store, mirror documents,
//! bucket objects) goes through [`atomic_write`], so a reader never observes
//! a half-written file.

use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `content` to `path` atomically.
///
/// The bytes go to a temp file in the target's directory, which is then
/// renamed over the target. The temp file is removed if any step fails.
/// Missing parent directories are created.
///
/// # Example
///
/// ```ignore
/// use crate::utils::atomic_write;
/// use std::path::Path;
///
/// atomic_write(Path::new("/data/items.json"), br#"{"items": {}}"#).await?;
/// ```
pub async fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no parent directory"))?
        .to_path_buf();
    let target_path = path.to_path_buf();
    let content_owned = content.to_vec();

    tokio::task::spawn_blocking(move || -> io::Result<()> {
        use std::io::Write;

        std::fs::create_dir_all(&parent)?;
        let mut temp_file = NamedTempFile::new_in(&parent)?;
        temp_file.write_all(&content_owned)?;
        temp_file.flush()?;
        // persist() renames over the target and disarms the auto-delete
        temp_file.persist(&target_path)?;

        Ok(())
    })
    .await
    .map_err(io::Error::other)?
}
