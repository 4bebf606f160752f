//! Remote document store abstraction and the field-level write primitives it accepts.

pub mod json_backend;
pub mod memory;
pub mod session_cache;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    domain::{Expense, Income, UserDocument},
    errors::Result,
};

pub use json_backend::JsonDocumentStore;
pub use memory::MemoryDocumentStore;
pub use session_cache::{FileSessionCache, MemorySessionCache, SessionCache};

/// Outcome of an applied write, carrying the store-assigned timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReceipt {
    pub update_time: DateTime<Utc>,
}

/// How an array field is written.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayWrite<T> {
    /// Overwrite the whole array.
    Replace(Vec<T>),
    /// Add each element not already present.
    Union(Vec<T>),
    /// Add every element at the end, duplicates included.
    Append(Vec<T>),
}

impl<T: Clone + PartialEq> ArrayWrite<T> {
    fn apply_to(&self, target: &mut Vec<T>) {
        match self {
            ArrayWrite::Replace(values) => *target = values.clone(),
            ArrayWrite::Union(values) => {
                for value in values {
                    if !target.contains(value) {
                        target.push(value.clone());
                    }
                }
            }
            ArrayWrite::Append(values) => target.extend(values.iter().cloned()),
        }
    }
}

/// Field writes applied atomically to one user document. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    pub income: Option<Option<Income>>,
    pub categories: Option<ArrayWrite<String>>,
    pub expenses: Option<ArrayWrite<Expense>>,
    pub reset_for_add_expense_ui: Option<bool>,
    pub reset_date: Option<Option<DateTime<Utc>>>,
}

impl DocumentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch that writes every field of `document`, as a full-document merge does.
    pub fn full(document: &UserDocument) -> Self {
        Self {
            income: Some(document.income.clone()),
            categories: Some(ArrayWrite::Replace(document.categories.clone())),
            expenses: Some(ArrayWrite::Replace(document.expenses.clone())),
            reset_for_add_expense_ui: Some(document.reset_for_add_expense_ui),
            reset_date: Some(document.reset_date),
        }
    }

    pub fn income(mut self, income: Option<Income>) -> Self {
        self.income = Some(income);
        self
    }

    pub fn categories(mut self, write: ArrayWrite<String>) -> Self {
        self.categories = Some(write);
        self
    }

    pub fn expenses(mut self, write: ArrayWrite<Expense>) -> Self {
        self.expenses = Some(write);
        self
    }

    pub fn reset_flag(mut self, flag: bool) -> Self {
        self.reset_for_add_expense_ui = Some(flag);
        self
    }

    pub fn reset_date(mut self, reset_date: Option<DateTime<Utc>>) -> Self {
        self.reset_date = Some(reset_date);
        self
    }

    /// Applies the patch to `document`.
    ///
    /// Expenses written by this patch without a creation time receive `server_time`.
    pub fn apply(&self, document: &mut UserDocument, server_time: DateTime<Utc>) {
        if let Some(income) = &self.income {
            document.income = income.clone();
        }
        if let Some(write) = &self.categories {
            write.apply_to(&mut document.categories);
        }
        if let Some(write) = &self.expenses {
            let first_written = match write {
                ArrayWrite::Replace(_) => 0,
                _ => document.expenses.len(),
            };
            write.apply_to(&mut document.expenses);
            for expense in document.expenses[first_written..]
                .iter_mut()
                .filter(|expense| expense.is_pending_timestamp())
            {
                expense.created_at = Some(server_time);
            }
        }
        if let Some(flag) = self.reset_for_add_expense_ui {
            document.reset_for_add_expense_ui = flag;
        }
        if let Some(reset_date) = self.reset_date {
            document.reset_date = reset_date;
        }
    }
}

/// Keyed document database holding one [`UserDocument`] per user.
///
/// Backends apply each write atomically, so array unions and appends from
/// concurrent writers never overwrite one another.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads the document for `user_id`, `None` when it does not exist.
    async fn get(&self, user_id: &str) -> Result<Option<UserDocument>>;

    /// Overwrites the whole document, creating it when absent.
    async fn set(&self, user_id: &str, document: &UserDocument) -> Result<WriteReceipt>;

    /// Applies `patch` to the document, creating an empty one first when absent.
    async fn merge(&self, user_id: &str, patch: &DocumentPatch) -> Result<WriteReceipt>;

    /// Applies `patch` to an existing document. Fails with `StoreError::NotFound` when absent.
    async fn update(&self, user_id: &str, patch: &DocumentPatch) -> Result<WriteReceipt>;
}
