use std::sync::Arc;

use expense_core::{
    domain::NewExpense,
    init,
    storage::{MemoryDocumentStore, MemorySessionCache},
    AuthSession, SyncStore,
};

#[tokio::test]
async fn sync_store_smoke() {
    init();

    let store = Arc::new(SyncStore::new(
        Arc::new(MemoryDocumentStore::new()),
        Arc::new(MemorySessionCache::new()),
    ));
    let session = AuthSession::new(store.clone());
    session.handle_identity(Some("smoke")).await.unwrap();

    store.add_category("smoke", "Food").await.unwrap();
    let now = store.clock().now();
    let stored = store
        .add_expense("smoke", NewExpense::new("Bread", 2.5, "Food", now))
        .await
        .unwrap();

    assert!(stored.created_at.is_some());
    let state = store.snapshot();
    assert_eq!(state.expenses.len(), 1);
    assert_eq!(state.in_scope_expenses().len(), 1);
    assert!(state.balance().is_none());
}
