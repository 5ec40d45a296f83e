use super::{check_path, Document, DocumentMirror, MirrorError};
use crate::utils::atomic_write;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

const DOC_EXTENSION: &str = ".json";

/// Mirror stored as `<root>/<collection>/<doc_id>.json` files.
#[derive(Debug, Clone)]
pub struct FileMirror {
    root: PathBuf,
}

impl FileMirror {
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn doc_path(&self, collection: &str, doc_id: &str) -> PathBuf {
        self.root
            .join(collection)
            .join(format!("{doc_id}{DOC_EXTENSION}"))
    }
}

#[async_trait]
impl DocumentMirror for FileMirror {
    async fn set(
        &self,
        collection: &str,
        doc_id: &str,
        document: Document,
    ) -> Result<(), MirrorError> {
        check_path(collection, Some(doc_id))?;
        let content = serde_json::to_vec_pretty(&document)?;
        atomic_write(&self.doc_path(collection, doc_id), &content).await?;
        Ok(())
    }

    async fn get(&self, collection: &str, doc_id: &str) -> Result<Option<Document>, MirrorError> {
        check_path(collection, Some(doc_id))?;
        match fs::read_to_string(self.doc_path(collection, doc_id)).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, collection: &str) -> Result<Vec<String>, MirrorError> {
        check_path(collection, None)?;
        let mut entries = match fs::read_dir(self.root.join(collection)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(id) = name.strip_suffix(DOC_EXTENSION) {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}
