#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use expense_core::{
    core::time::ManualClock,
    domain::UserDocument,
    errors::{Result, StoreError},
    storage::{
        DocumentPatch, DocumentStore, JsonDocumentStore, MemoryDocumentStore, MemorySessionCache,
        WriteReceipt,
    },
    SyncStore,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn start_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

/// Document store wrapper whose reads and writes can be made to fail on demand.
pub struct FlakyStore<D> {
    inner: D,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl<D: DocumentStore> FlakyStore<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_write(&self) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::RemoteIo("connection reset".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl<D: DocumentStore> DocumentStore for FlakyStore<D> {
    async fn get(&self, user_id: &str) -> Result<Option<UserDocument>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::RemoteIo("unavailable".into()));
        }
        self.inner.get(user_id).await
    }

    async fn set(&self, user_id: &str, document: &UserDocument) -> Result<WriteReceipt> {
        self.check_write()?;
        self.inner.set(user_id, document).await
    }

    async fn merge(&self, user_id: &str, patch: &DocumentPatch) -> Result<WriteReceipt> {
        self.check_write()?;
        self.inner.merge(user_id, patch).await
    }

    async fn update(&self, user_id: &str, patch: &DocumentPatch) -> Result<WriteReceipt> {
        self.check_write()?;
        self.inner.update(user_id, patch).await
    }
}

/// Store wired to in-memory collaborators, with handles kept for inspection.
pub struct Harness {
    pub store: Arc<SyncStore>,
    pub documents: Arc<FlakyStore<MemoryDocumentStore>>,
    pub cache: Arc<MemorySessionCache>,
    pub clock: Arc<ManualClock>,
}

pub fn memory_harness() -> Harness {
    let clock = Arc::new(ManualClock::new(start_instant()));
    let documents = Arc::new(FlakyStore::new(MemoryDocumentStore::with_clock(
        clock.clone(),
    )));
    let cache = Arc::new(MemorySessionCache::new());
    let store = Arc::new(SyncStore::with_clock(
        documents.clone(),
        cache.clone(),
        clock.clone(),
    ));
    Harness {
        store,
        documents,
        cache,
        clock,
    }
}

/// Creates a JSON document store rooted in a fresh temporary directory.
pub fn json_store(clock: Arc<ManualClock>) -> JsonDocumentStore {
    let temp = TempDir::new().expect("create temp dir");
    let root = temp.path().join("users");
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    JsonDocumentStore::with_clock(root, clock).expect("create json document store")
}
