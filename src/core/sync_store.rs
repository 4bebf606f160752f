//! The sync store: single in-memory mirror of the signed-in user's document and
//! the only gateway to the document store.
//!
//! Every mutation is written remotely first and mirrored locally once the write
//! is acknowledged. State is published through a `watch` channel so readers
//! always observe whole assignments.

use std::{future::Future, sync::Arc};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::{
    core::time::{Clock, SystemClock},
    domain::{cycle::CycleBalance, Expense, Income, IncomeCycle, NewExpense, UserDocument},
    errors::{Result, StoreError},
    storage::{
        session_cache::{user_key, CURRENT_USER_KEY, WELL_KNOWN_KEYS},
        ArrayWrite, DocumentPatch, DocumentStore, SessionCache, WriteReceipt,
    },
};

/// Snapshot of everything the store mirrors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    pub current_user_id: Option<String>,
    pub income: Option<Income>,
    pub categories: Vec<String>,
    pub expenses: Vec<Expense>,
    pub reset_for_add_expense_ui: bool,
    pub reset_date: Option<DateTime<Utc>>,
    pub loading: bool,
    pub error: Option<String>,
}

impl StoreState {
    /// Replaces every document field with the contents of `document`.
    fn mirror(&mut self, document: UserDocument) {
        self.income = document.income;
        self.categories = document.categories;
        self.expenses = document.expenses;
        self.reset_for_add_expense_ui = document.reset_for_add_expense_ui;
        self.reset_date = document.reset_date;
    }

    pub fn document(&self) -> UserDocument {
        UserDocument {
            income: self.income.clone(),
            categories: self.categories.clone(),
            expenses: self.expenses.clone(),
            reset_for_add_expense_ui: self.reset_for_add_expense_ui,
            reset_date: self.reset_date,
        }
    }

    pub fn cycle(&self) -> IncomeCycle {
        IncomeCycle::from_parts(self.income.as_ref(), self.reset_date)
    }

    /// Expenses counted toward the balance shown while adding new expenses.
    pub fn in_scope_expenses(&self) -> Vec<&Expense> {
        self.cycle().in_scope(&self.expenses)
    }

    pub fn balance(&self) -> Option<CycleBalance> {
        self.cycle().balance(self.income.as_ref(), &self.expenses)
    }
}

/// Explicitly owned store shared between readers through `Arc<SyncStore>`.
pub struct SyncStore {
    documents: Arc<dyn DocumentStore>,
    cache: Arc<dyn SessionCache>,
    clock: Arc<dyn Clock>,
    state: watch::Sender<StoreState>,
}

impl SyncStore {
    pub fn new(documents: Arc<dyn DocumentStore>, cache: Arc<dyn SessionCache>) -> Self {
        Self::with_clock(documents, cache, Arc::new(SystemClock))
    }

    pub fn with_clock(
        documents: Arc<dyn DocumentStore>,
        cache: Arc<dyn SessionCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            documents,
            cache,
            clock,
            state: watch::Sender::new(StoreState::default()),
        }
    }

    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    /// Receiver notified after every state assignment.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    pub fn current_user_id(&self) -> Option<String> {
        self.state.borrow().current_user_id.clone()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// User id remembered by a previous session, if any.
    pub fn remembered_user_id(&self) -> Result<Option<String>> {
        self.cache.get(CURRENT_USER_KEY)
    }

    /// Loads the user's document, creating an empty skeleton when none exists.
    ///
    /// On failure the error is recorded in the state and prior local data is kept.
    pub async fn fetch_user_data(&self, user_id: &str) -> Result<()> {
        self.state.send_modify(|state| state.loading = true);
        info!(user_id, "fetching user data");

        match self.load_or_create(user_id).await {
            Ok(document) => {
                self.state.send_modify(|state| {
                    state.mirror(document);
                    state.loading = false;
                });
                Ok(())
            }
            Err(err) => {
                error!(user_id, error = %err, "failed to fetch user data");
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(err.to_string());
                });
                Err(err)
            }
        }
    }

    async fn load_or_create(&self, user_id: &str) -> Result<UserDocument> {
        if let Some(document) = self.documents.get(user_id).await? {
            return Ok(document);
        }
        info!(user_id, "no document found, creating skeleton");
        let skeleton = UserDocument::skeleton();
        self.documents.set(user_id, &skeleton).await?;
        Ok(skeleton)
    }

    pub fn set_current_user_id(&self, user_id: &str) {
        self.state.send_modify(|state| state.current_user_id = Some(user_id.to_string()));
        if let Err(err) = self.cache.set(CURRENT_USER_KEY, user_id) {
            warn!(user_id, error = %err, "could not remember current user");
        }
    }

    /// Replaces the income and starts a fresh cycle.
    pub async fn set_income(&self, user_id: &str, income: Income) -> Result<()> {
        let patch = DocumentPatch::new()
            .income(Some(income.clone()))
            .reset_flag(false)
            .reset_date(None);
        self.write("set income", self.documents.merge(user_id, &patch)).await?;

        info!(user_id, amount = income.amount, received = %income.received_date, "income set");
        self.state.send_modify(|state| {
            state.income = Some(income);
            state.reset_for_add_expense_ui = false;
            state.reset_date = None;
        });
        Ok(())
    }

    /// Clears the income and opens a reset window starting now. Expenses are kept.
    pub async fn reset_income(&self, user_id: &str) -> Result<()> {
        let now = self.clock.now();
        let patch = DocumentPatch::new()
            .income(None)
            .reset_flag(true)
            .reset_date(Some(now));
        self.write("reset income", self.documents.merge(user_id, &patch)).await?;

        info!(user_id, reset_date = %now, "income reset");
        self.state.send_modify(|state| {
            state.income = None;
            state.reset_for_add_expense_ui = true;
            state.reset_date = Some(now);
        });
        Ok(())
    }

    /// Drops the reset flag while moving the reset window to now.
    pub async fn clear_expense_ui_reset(&self, user_id: &str) -> Result<()> {
        let now = self.clock.now();
        let patch = DocumentPatch::new().reset_flag(false).reset_date(Some(now));
        self.write("clear expense reset", self.documents.merge(user_id, &patch)).await?;

        self.state.send_modify(|state| {
            state.reset_for_add_expense_ui = false;
            state.reset_date = Some(now);
        });
        Ok(())
    }

    /// Adds `name` to the category set, recreating the document if it vanished.
    pub async fn add_category(&self, user_id: &str, name: &str) -> Result<()> {
        let patch = DocumentPatch::new().categories(ArrayWrite::Union(vec![name.to_string()]));

        match self.documents.update(user_id, &patch).await {
            Ok(_) => {
                info!(user_id, category = name, "category added");
                self.state.send_modify(|state| {
                    if !state.categories.iter().any(|existing| existing == name) {
                        state.categories.push(name.to_string());
                    }
                });
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                warn!(user_id, category = name, "document missing, recreating with category");
                let mut seed = UserDocument::skeleton();
                seed.insert_category(name);
                self.recreate(user_id, "add category", &patch, seed).await?;
                Ok(())
            }
            Err(err) => Err(self.record("add category", err)),
        }
    }

    /// Appends an expense. The income is never touched.
    ///
    /// Returns the expense as stored, with its store-assigned creation time.
    pub async fn add_expense(&self, user_id: &str, expense: NewExpense) -> Result<Expense> {
        let pending = expense.into_expense();
        let patch = DocumentPatch::new().expenses(ArrayWrite::Append(vec![pending.clone()]));

        match self.documents.update(user_id, &patch).await {
            Ok(receipt) => {
                let mut stored = pending;
                stored.created_at = Some(receipt.update_time);
                info!(user_id, name = %stored.name, amount = stored.amount, "expense added");
                let mirrored = stored.clone();
                self.state.send_modify(move |state| state.expenses.push(mirrored));
                Ok(stored)
            }
            Err(err) if err.is_not_found() => {
                warn!(user_id, "document missing, recreating with expense");
                let mut seed = UserDocument::skeleton();
                seed.expenses.push(pending.clone());
                let receipt = self.recreate(user_id, "add expense", &patch, seed).await?;
                let mut stored = pending;
                stored.created_at = Some(receipt.update_time);
                Ok(stored)
            }
            Err(err) => Err(self.record("add expense", err)),
        }
    }

    /// Clears all mirrored state and purges cached session entries.
    ///
    /// Every key is attempted; cache failures are logged and never stop a logout.
    pub fn logout(&self) {
        let previous = self.current_user_id();
        self.state.send_replace(StoreState::default());
        info!(previous = previous.as_deref().unwrap_or("-"), "logged out");

        let mut keys: Vec<String> = WELL_KNOWN_KEYS.iter().map(|key| key.to_string()).collect();
        if let Some(user_id) = previous.as_deref() {
            keys.push(user_key(user_id));
        }
        for key in keys {
            if let Err(err) = self.cache.remove(&key) {
                warn!(key = %key, error = %err, "could not purge session cache entry");
            }
        }
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|state| state.error = None);
    }

    /// Merge-writes `patch` onto a recreated document and mirrors `seed` locally.
    ///
    /// The backend materializes an absent document as the empty skeleton before
    /// applying the patch, so the remote result equals `seed`.
    async fn recreate(
        &self,
        user_id: &str,
        action: &str,
        patch: &DocumentPatch,
        mut seed: UserDocument,
    ) -> Result<WriteReceipt> {
        let receipt = self.write(action, self.documents.merge(user_id, patch)).await?;
        for expense in seed.expenses.iter_mut() {
            expense.created_at.get_or_insert(receipt.update_time);
        }
        self.state.send_modify(|state| state.mirror(seed));
        Ok(receipt)
    }

    async fn write<F, T>(&self, action: &str, write: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        write.await.map_err(|err| self.record(action, err))
    }

    /// Stores the failure message in the state and hands the error back.
    fn record(&self, action: &str, err: StoreError) -> StoreError {
        error!(action, error = %err, "store operation failed");
        let message = err.to_string();
        self.state.send_modify(|state| state.error = Some(message));
        err
    }
}
