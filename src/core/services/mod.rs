//! Caller-side validation and reporting built on top of the sync store.
//!
//! Validation happens here, before any remote call; the store itself trusts
//! its inputs.

pub mod category_service;
pub mod expense_service;
pub mod income_service;
pub mod summary_service;

pub use category_service::CategoryService;
pub use expense_service::{ExpenseForm, ExpenseService};
pub use income_service::{IncomeForm, IncomeService};
pub use summary_service::SummaryService;

use crate::{config::Config, errors::StoreError};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl ServiceError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Invalid {
            field,
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Invalid { .. })
    }
}

/// Limits applied by the form services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRules {
    pub category_min_len: usize,
    pub category_max_len: usize,
    pub salary_cycle_days: i64,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            category_min_len: 3,
            category_max_len: 50,
            salary_cycle_days: 30,
        }
    }
}

impl From<&Config> for ValidationRules {
    fn from(config: &Config) -> Self {
        Self {
            category_min_len: config.category_min_len,
            category_max_len: config.category_max_len,
            salary_cycle_days: config.salary_cycle_days,
        }
    }
}
