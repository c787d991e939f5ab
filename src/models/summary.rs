//! This file defines the derived types produced by the dashboard
//! aggregation: monthly balance buckets, category totals, and the summary
//! envelope. None of these are persisted; they are computed fresh per
//! request and discarded after serialization.

use serde::Serialize;
use time::{Date, Month};

use crate::models::CategoryName;

/// An aggregation bucket keyed by calendar month and year.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthYear {
    /// The calendar month of the bucket.
    pub month: Month,
    /// The calendar year of the bucket.
    pub year: i32,
}

impl MonthYear {
    /// The bucket immediately before this one.
    pub fn previous(&self) -> Self {
        match self.month {
            Month::January => Self {
                month: Month::December,
                year: self.year - 1,
            },
            month => Self {
                month: month.previous(),
                year: self.year,
            },
        }
    }

    /// The `YYYY-MM` label for this bucket, e.g. "2025-01".
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month as u8)
    }
}

impl From<Date> for MonthYear {
    fn from(date: Date) -> Self {
        Self {
            month: date.month(),
            year: date.year(),
        }
    }
}

/// The `YYYY-MM` bucket label of a date, e.g. "2025-01" for any day in
/// January 2025.
pub fn month_label(date: Date) -> String {
    MonthYear::from(date).label()
}

/// The income, expense, and running balance of a single month bucket.
///
/// `saldo` is the running balance as of this bucket. Under the ledger-driven
/// policy it carries forward from the previous bucket (`prev_saldo`); under
/// the fixed calendar window policy it is simply `income - expense` and
/// `prev_saldo` is omitted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthlyBalance {
    /// Human-readable month name, e.g. "January".
    pub month: String,
    /// The calendar year of the bucket.
    pub year: i32,
    /// Total income for the bucket.
    pub income: f64,
    /// Total expense for the bucket.
    pub expense: f64,
    /// The running balance carried into this bucket, if the policy models a
    /// carry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_saldo: Option<f64>,
    /// The balance as of this bucket.
    pub saldo: f64,
}

/// The dashboard summary response.
///
/// The grand totals cover the entire ledger, not just the windowed monthly
/// buckets.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// Total income minus total expense over the whole ledger.
    pub total_balance: f64,
    /// Total income over the whole ledger.
    pub total_income: f64,
    /// Total expense over the whole ledger.
    pub total_expense: f64,
    /// The most recent monthly buckets, newest first.
    pub monthly_balance: Vec<MonthlyBalance>,
}

/// The summed amount for a single category label.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The category label.
    pub category: CategoryName,
    /// The summed amount over all matching transaction-category memberships.
    pub total: f64,
}

/// The category totals of a single month in the monthly category matrix.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthlyCategoryGroup {
    /// The `YYYY-MM` label of the month.
    pub month: String,
    /// Per-category totals within the month.
    pub categories: Vec<CategoryTotal>,
}
