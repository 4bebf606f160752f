use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::{fs, sync::Mutex};

use crate::{
    core::{
        time::{Clock, SystemClock},
        utils::{canonical_user_key, tmp_path},
    },
    domain::UserDocument,
    errors::{Result, StoreError},
};

use super::{DocumentPatch, DocumentStore, WriteReceipt};

/// Document store that keeps one pretty-printed JSON file per user.
///
/// Writes are serialized through a single lock and land atomically by staging
/// to a temporary file and renaming it over the original.
pub struct JsonDocumentStore {
    root: PathBuf,
    write_lock: Mutex<()>,
    clock: Arc<dyn Clock>,
}

impl JsonDocumentStore {
    pub fn new(root: PathBuf) -> Result<Self> {
        Self::with_clock(root, Arc::new(SystemClock))
    }

    pub fn with_clock(root: PathBuf, clock: Arc<dyn Clock>) -> Result<Self> {
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
            clock,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self, user_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", canonical_user_key(user_id)))
    }

    /// Deletes a document out-of-band. Returns whether a file was removed.
    pub async fn remove(&self, user_id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        match fs::remove_file(self.document_path(user_id)).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(remote_io(err)),
        }
    }

    async fn read(&self, path: &Path) -> Result<Option<UserDocument>> {
        match fs::read_to_string(path).await {
            Ok(data) => Ok(Some(serde_json::from_str(&data)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(remote_io(err)),
        }
    }

    async fn write(&self, path: &Path, document: &UserDocument) -> Result<()> {
        let json = serde_json::to_string_pretty(document)?;
        let tmp = tmp_path(path);
        fs::write(&tmp, json).await.map_err(remote_io)?;
        fs::rename(&tmp, path).await.map_err(remote_io)?;
        Ok(())
    }

    fn receipt(&self) -> WriteReceipt {
        WriteReceipt {
            update_time: self.clock.now(),
        }
    }
}

fn remote_io(err: std::io::Error) -> StoreError {
    StoreError::RemoteIo(err.to_string())
}

#[async_trait]
impl DocumentStore for JsonDocumentStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserDocument>> {
        self.read(&self.document_path(user_id)).await
    }

    async fn set(&self, user_id: &str, document: &UserDocument) -> Result<WriteReceipt> {
        let _guard = self.write_lock.lock().await;
        let receipt = self.receipt();
        let mut stored = UserDocument::skeleton();
        DocumentPatch::full(document).apply(&mut stored, receipt.update_time);
        self.write(&self.document_path(user_id), &stored).await?;
        Ok(receipt)
    }

    async fn merge(&self, user_id: &str, patch: &DocumentPatch) -> Result<WriteReceipt> {
        let _guard = self.write_lock.lock().await;
        let path = self.document_path(user_id);
        let receipt = self.receipt();
        let mut document = self.read(&path).await?.unwrap_or_default();
        patch.apply(&mut document, receipt.update_time);
        self.write(&path, &document).await?;
        Ok(receipt)
    }

    async fn update(&self, user_id: &str, patch: &DocumentPatch) -> Result<WriteReceipt> {
        let _guard = self.write_lock.lock().await;
        let path = self.document_path(user_id);
        let receipt = self.receipt();
        let mut document = self
            .read(&path)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("users/{}", user_id)))?;
        patch.apply(&mut document, receipt.update_time);
        self.write(&path, &document).await?;
        Ok(receipt)
    }
}
