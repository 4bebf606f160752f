//! The per-user document mirrored by the sync store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::domain::{expense::Expense, income::Income};

/// One document per user, keyed by user identifier in the document store.
///
/// Every field carries a serde default so documents written by older clients
/// (or created with only a subset of fields) load as a complete skeleton.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(default, deserialize_with = "income_or_placeholder")]
    pub income: Option<Income>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default, rename = "resetForAddExpenseUI")]
    pub reset_for_add_expense_ui: bool,
    #[serde(default)]
    pub reset_date: Option<DateTime<Utc>>,
}

/// Stored income: a full record, or the bare number older clients wrote as a placeholder.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredIncome {
    Record(Income),
    Placeholder(f64),
}

fn income_or_placeholder<'de, D>(deserializer: D) -> Result<Option<Income>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored = Option::<StoredIncome>::deserialize(deserializer)?;
    Ok(match stored {
        Some(StoredIncome::Record(income)) => Some(income),
        Some(StoredIncome::Placeholder(amount)) => {
            debug!(amount, "numeric income placeholder loaded as no income");
            None
        }
        None => None,
    })
}

impl UserDocument {
    /// Empty document written the first time a user is seen.
    pub fn skeleton() -> Self {
        Self::default()
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|existing| existing == name)
    }

    /// Adds `name` unless an identical entry already exists. Returns whether it was added.
    pub fn insert_category(&mut self, name: &str) -> bool {
        if self.has_category(name) {
            return false;
        }
        self.categories.push(name.to_string());
        true
    }
}
