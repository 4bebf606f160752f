use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    core::time::{Clock, SystemClock},
    domain::UserDocument,
    errors::{Result, StoreError},
};

use super::{DocumentPatch, DocumentStore, WriteReceipt};

/// Process-local document store. Each write holds the map lock for its whole duration.
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<String, UserDocument>>,
    clock: Arc<dyn Clock>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Deletes a document out-of-band, as an administrator would.
    pub async fn remove(&self, user_id: &str) -> bool {
        self.documents.write().await.remove(user_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    fn receipt(&self) -> WriteReceipt {
        WriteReceipt {
            update_time: self.clock.now(),
        }
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserDocument>> {
        Ok(self.documents.read().await.get(user_id).cloned())
    }

    async fn set(&self, user_id: &str, document: &UserDocument) -> Result<WriteReceipt> {
        let receipt = self.receipt();
        let mut stored = UserDocument::skeleton();
        DocumentPatch::full(document).apply(&mut stored, receipt.update_time);
        self.documents
            .write()
            .await
            .insert(user_id.to_string(), stored);
        Ok(receipt)
    }

    async fn merge(&self, user_id: &str, patch: &DocumentPatch) -> Result<WriteReceipt> {
        let receipt = self.receipt();
        let mut documents = self.documents.write().await;
        let document = documents.entry(user_id.to_string()).or_default();
        patch.apply(document, receipt.update_time);
        Ok(receipt)
    }

    async fn update(&self, user_id: &str, patch: &DocumentPatch) -> Result<WriteReceipt> {
        let receipt = self.receipt();
        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(format!("users/{}", user_id)))?;
        patch.apply(document, receipt.update_time);
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ArrayWrite;

    #[tokio::test]
    async fn update_requires_existing_document() {
        let store = MemoryDocumentStore::new();
        let patch = DocumentPatch::new().categories(ArrayWrite::Union(vec!["Food".into()]));

        let err = store.update("alice", &patch).await.unwrap_err();
        assert!(err.is_not_found(), "unexpected error: {err:?}");

        store.merge("alice", &patch).await.unwrap();
        store.update("alice", &patch).await.unwrap();
        let doc = store.get("alice").await.unwrap().unwrap();
        assert_eq!(doc.categories, vec!["Food"]);
    }

    #[tokio::test]
    async fn remove_drops_the_document() {
        let store = MemoryDocumentStore::new();
        store.set("bob", &UserDocument::skeleton()).await.unwrap();
        assert!(store.remove("bob").await);
        assert!(store.get("bob").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }
}
