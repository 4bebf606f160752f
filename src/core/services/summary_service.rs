//! Aggregations behind the dashboard and report views.
//!
//! Totals are computed over the complete expense history; only
//! [`SummaryService::cycle_snapshot`] applies the income-cycle scope.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::{
    core::sync_store::StoreState,
    domain::{common::total, cycle::CycleBalance, Expense, IncomeCycle},
};

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ExpenseTotals {
    pub total: f64,
    pub count: usize,
    pub average: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryTotal {
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthTotal {
    /// Short month and year, e.g. `Jan 2025`.
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CycleSnapshot {
    pub cycle: IncomeCycle,
    pub in_scope_count: usize,
    pub balance: Option<CycleBalance>,
}

pub struct SummaryService;

impl SummaryService {
    pub fn totals(expenses: &[Expense]) -> ExpenseTotals {
        let total = total(expenses);
        let count = expenses.len();
        let average = if count > 0 { total / count as f64 } else { 0.0 };
        ExpenseTotals {
            total,
            count,
            average,
        }
    }

    /// Per-category totals in the order categories first appear.
    pub fn by_category(expenses: &[Expense]) -> Vec<CategoryTotal> {
        let mut totals: Vec<CategoryTotal> = Vec::new();
        for expense in expenses {
            match totals.iter_mut().find(|entry| entry.name == expense.category) {
                Some(entry) => entry.amount += expense.amount,
                None => totals.push(CategoryTotal {
                    name: expense.category.clone(),
                    amount: expense.amount,
                }),
            }
        }
        totals
    }

    /// Per-month totals in chronological order.
    pub fn by_month(expenses: &[Expense]) -> Vec<MonthTotal> {
        let mut buckets: BTreeMap<(i32, u32), (String, f64)> = BTreeMap::new();
        for expense in expenses {
            let key = (expense.date.year(), expense.date.month());
            let bucket = buckets
                .entry(key)
                .or_insert_with(|| (expense.date.format("%b %Y").to_string(), 0.0));
            bucket.1 += expense.amount;
        }
        buckets
            .into_iter()
            .map(|((year, month), (label, amount))| MonthTotal {
                label,
                year,
                month,
                amount,
            })
            .collect()
    }

    pub fn cycle_snapshot(state: &StoreState) -> CycleSnapshot {
        CycleSnapshot {
            cycle: state.cycle(),
            in_scope_count: state.in_scope_expenses().len(),
            balance: state.balance(),
        }
    }
}
