//! Expense entries recorded against a user category.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::{Amounted, Displayable};

/// Expense as stored in the user document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub name: String,
    pub amount: f64,
    pub category: String,
    pub date: DateTime<Utc>,
    /// Assigned by the document store when the write is applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Expense {
    pub fn is_pending_timestamp(&self) -> bool {
        self.created_at.is_none()
    }
}

impl Amounted for Expense {
    fn amount(&self) -> f64 {
        self.amount
    }
}

impl Displayable for Expense {
    fn display_label(&self) -> String {
        format!(
            "{} [{}] {:.2} on {}",
            self.name,
            self.category,
            self.amount,
            self.date.format("%Y-%m-%d")
        )
    }
}

/// Validated expense submitted by a caller, not yet written anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub name: String,
    pub amount: f64,
    pub category: String,
    pub date: DateTime<Utc>,
}

impl NewExpense {
    pub fn new(
        name: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            category: category.into(),
            date,
        }
    }

    /// Converts into a stored expense whose creation time the store will assign.
    pub fn into_expense(self) -> Expense {
        Expense {
            name: self.name,
            amount: self.amount,
            category: self.category,
            date: self.date,
            created_at: None,
        }
    }
}
