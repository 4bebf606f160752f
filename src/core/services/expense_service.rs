//! Validation for the add-expense form.

use chrono::{DateTime, Utc};

use crate::{
    core::sync_store::SyncStore,
    domain::{Expense, NewExpense},
};

use super::{ServiceError, ServiceResult};

/// Raw form input, exactly as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseForm {
    pub name: String,
    pub amount: String,
    pub category: String,
}

impl ExpenseForm {
    pub fn new(
        name: impl Into<String>,
        amount: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            amount: amount.into(),
            category: category.into(),
        }
    }
}

pub struct ExpenseService;

impl ExpenseService {
    /// Parses and checks `form`, dating the expense at `now`.
    ///
    /// The category must be one of `known_categories`.
    pub fn validate(
        form: &ExpenseForm,
        known_categories: &[String],
        now: DateTime<Utc>,
    ) -> ServiceResult<NewExpense> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(ServiceError::invalid("name", "Expense name is required"));
        }
        let amount = parse_amount(&form.amount)?;
        let category = form.category.trim();
        if category.is_empty() {
            return Err(ServiceError::invalid("category", "Category is required"));
        }
        if !known_categories.iter().any(|known| known == category) {
            return Err(ServiceError::invalid(
                "category",
                format!("Unknown category `{}`", category),
            ));
        }
        Ok(NewExpense::new(name, amount, category, now))
    }

    pub async fn submit(
        store: &SyncStore,
        user_id: &str,
        form: &ExpenseForm,
    ) -> ServiceResult<Expense> {
        let categories = store.snapshot().categories;
        let expense = Self::validate(form, &categories, store.clock().now())?;
        Ok(store.add_expense(user_id, expense).await?)
    }
}

/// Parses a strictly positive, finite amount.
pub(crate) fn parse_amount(raw: &str) -> ServiceResult<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::invalid("amount", "Amount is required"));
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| ServiceError::invalid("amount", "Please enter a valid number"))?;
    if !value.is_finite() {
        return Err(ServiceError::invalid("amount", "Please enter a valid number"));
    }
    if value <= 0.0 {
        return Err(ServiceError::invalid("amount", "Amount must be greater than zero"));
    }
    Ok(value)
}
