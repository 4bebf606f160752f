//! Validation for the add-income form.

use chrono::NaiveDate;

use crate::{core::sync_store::SyncStore, domain::Income};

use super::{expense_service::parse_amount, ServiceError, ServiceResult, ValidationRules};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomeForm {
    pub amount: String,
    /// Calendar day formatted as `YYYY-MM-DD`.
    pub received_date: String,
}

impl IncomeForm {
    pub fn new(amount: impl Into<String>, received_date: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            received_date: received_date.into(),
        }
    }
}

pub struct IncomeService;

impl IncomeService {
    /// Builds the income record; received dates before `today` are rejected.
    pub fn validate(
        form: &IncomeForm,
        rules: &ValidationRules,
        today: NaiveDate,
    ) -> ServiceResult<Income> {
        let amount = parse_amount(&form.amount).map_err(|err| match err {
            ServiceError::Invalid { message, .. } => {
                ServiceError::invalid("income", message.replace("Amount", "Income"))
            }
            other => other,
        })?;
        let raw_date = form.received_date.trim();
        if raw_date.is_empty() {
            return Err(ServiceError::invalid("date", "Date is required"));
        }
        let received_date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .map_err(|_| ServiceError::invalid("date", "Date must be formatted as YYYY-MM-DD"))?;
        if received_date < today {
            return Err(ServiceError::invalid("date", "Cannot select a past date"));
        }
        Ok(Income::new(amount, received_date, rules.salary_cycle_days))
    }

    pub async fn submit(
        store: &SyncStore,
        user_id: &str,
        rules: &ValidationRules,
        form: &IncomeForm,
    ) -> ServiceResult<Income> {
        let income = Self::validate(form, rules, store.clock().today())?;
        store.set_income(user_id, income.clone()).await?;
        Ok(income)
    }
}
