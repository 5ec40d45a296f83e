use super::{check_path, Document, DocumentMirror, MirrorError};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Mirror kept in process memory. Clones share the same documents.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMirror {
    collections: Arc<RwLock<HashMap<String, BTreeMap<String, Document>>>>,
}

impl InMemoryMirror {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentMirror for InMemoryMirror {
    async fn set(
        &self,
        collection: &str,
        doc_id: &str,
        document: Document,
    ) -> Result<(), MirrorError> {
        check_path(collection, Some(doc_id))?;
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(doc_id.to_string(), document);
        Ok(())
    }

    async fn get(&self, collection: &str, doc_id: &str) -> Result<Option<Document>, MirrorError> {
        check_path(collection, Some(doc_id))?;
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.get(doc_id))
            .cloned())
    }

    async fn list(&self, collection: &str) -> Result<Vec<String>, MirrorError> {
        check_path(collection, None)?;
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|docs| docs.keys().cloned().collect())
            .unwrap_or_default())
    }
}
