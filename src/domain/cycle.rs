//! Derives which expenses count toward the balance of the current income cycle.
//!
//! Expenses are never deleted when an income is reset. Reports always see the
//! full list; only the running balance shown while adding expenses is scoped
//! by the cycle derived here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{common::total, expense::Expense, income::Income};

/// Cycle state computed from the income and reset fields of a user document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IncomeCycle {
    /// No income recorded and no reset in effect.
    NoIncome,
    /// Expenses on or after the income's received date are in scope.
    ActiveCycle { received_date: NaiveDate },
    /// Expenses strictly after the reset instant are in scope, whatever the income says.
    ResetPending { reset_date: DateTime<Utc> },
}

impl IncomeCycle {
    pub fn from_parts(income: Option<&Income>, reset_date: Option<DateTime<Utc>>) -> Self {
        match (reset_date, income) {
            (Some(reset_date), _) => IncomeCycle::ResetPending { reset_date },
            (None, Some(income)) => IncomeCycle::ActiveCycle {
                received_date: income.received_date,
            },
            (None, None) => IncomeCycle::NoIncome,
        }
    }

    /// Whether `expense` counts toward the balance of this cycle.
    ///
    /// The income boundary is inclusive while the reset boundary is exclusive.
    pub fn includes(&self, expense: &Expense) -> bool {
        match self {
            IncomeCycle::NoIncome => true,
            IncomeCycle::ActiveCycle { received_date } => {
                expense.date.date_naive() >= *received_date
            }
            IncomeCycle::ResetPending { reset_date } => expense.date > *reset_date,
        }
    }

    pub fn in_scope<'a>(&self, expenses: &'a [Expense]) -> Vec<&'a Expense> {
        expenses
            .iter()
            .filter(|expense| self.includes(expense))
            .collect()
    }

    /// Remaining balance for the cycle, or `None` when there is no income to spend from.
    pub fn balance(&self, income: Option<&Income>, expenses: &[Expense]) -> Option<CycleBalance> {
        let income = income?;
        let spent = total(self.in_scope(expenses));
        Some(CycleBalance {
            income: income.amount,
            spent,
            remaining: income.amount - spent,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CycleBalance {
    pub income: f64,
    pub spent: f64,
    pub remaining: f64,
}
