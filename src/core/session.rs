//! Keeps the sync store aligned with the identity reported by the sign-in provider.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::watch;
use tracing::{error, info};

use crate::{core::sync_store::SyncStore, errors::Result};

/// Reacts to "signed-in identity changed" notifications.
pub struct AuthSession {
    store: Arc<SyncStore>,
    initialized: AtomicBool,
}

impl AuthSession {
    pub fn new(store: Arc<SyncStore>) -> Self {
        Self {
            store,
            initialized: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &Arc<SyncStore> {
        &self.store
    }

    /// True once the first identity notification has been handled, successfully or not.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Applies one identity change.
    ///
    /// A different user replaces the previous one only after a full logout, and
    /// data is always re-fetched from the document store on sign-in.
    pub async fn handle_identity(&self, identity: Option<&str>) -> Result<()> {
        let outcome = self.apply_identity(identity).await;
        if let Err(err) = &outcome {
            error!(error = %err, "auth initialization failed");
        }
        self.initialized.store(true, Ordering::Release);
        outcome
    }

    async fn apply_identity(&self, identity: Option<&str>) -> Result<()> {
        match identity {
            Some(user_id) => {
                if let Some(previous) = self.store.current_user_id() {
                    if previous != user_id {
                        info!(previous = %previous, next = user_id, "switching user");
                        self.store.logout();
                    }
                }
                self.store.set_current_user_id(user_id);
                self.store.fetch_user_data(user_id).await
            }
            None => {
                self.store.logout();
                Ok(())
            }
        }
    }

    /// Handles notifications until the provider drops its sender.
    ///
    /// The value current at call time is handled first.
    pub async fn run(&self, mut identities: watch::Receiver<Option<String>>) {
        loop {
            let identity = identities.borrow_and_update().clone();
            // failures are recorded in the store and logged; keep listening
            let _ = self.handle_identity(identity.as_deref()).await;
            if identities.changed().await.is_err() {
                break;
            }
        }
    }

    /// Signs back in as the user remembered by the session cache, if any.
    pub async fn restore(&self) -> Result<Option<String>> {
        let remembered = self.store.remembered_user_id()?;
        if let Some(user_id) = remembered.as_deref() {
            info!(user_id, "restoring remembered session");
            self.handle_identity(Some(user_id)).await?;
        }
        Ok(remembered)
    }
}
