//! Income records that open a new spending cycle.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::common::{Amounted, Displayable};

/// Salary received on `received_date`, expected again on `next_salary_date`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    pub amount: f64,
    pub received_date: NaiveDate,
    pub next_salary_date: NaiveDate,
}

impl Income {
    /// Builds an income whose next salary date lies `cycle_days` after `received_date`.
    pub fn new(amount: f64, received_date: NaiveDate, cycle_days: i64) -> Self {
        Self {
            amount,
            received_date,
            next_salary_date: received_date + Duration::days(cycle_days),
        }
    }
}

impl Amounted for Income {
    fn amount(&self) -> f64 {
        self.amount
    }
}

impl Displayable for Income {
    fn display_label(&self) -> String {
        format!(
            "{:.2} received {} (next salary {})",
            self.amount, self.received_date, self.next_salary_date
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_salary_date_follows_cycle_length() {
        let received = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let income = Income::new(1000.0, received, 30);
        assert_eq!(
            income.next_salary_date,
            NaiveDate::from_ymd_opt(2025, 2, 14).unwrap()
        );
    }

    #[test]
    fn serializes_dates_as_plain_calendar_days() {
        let received = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let json = serde_json::to_value(Income::new(250.0, received, 30)).unwrap();
        assert_eq!(json["receivedDate"], "2025-03-01");
        assert_eq!(json["nextSalaryDate"], "2025-03-31");
    }
}
