//! The dashboard aggregation engine and its route handlers.
//!
//! Everything here is derived on demand from the raw transaction ledger via
//! the [TransactionStore] aggregation queries: monthly balances with a
//! running saldo, grand totals, flat per-category breakdowns, and the
//! monthly expense-per-category matrix. Nothing is cached or persisted;
//! each request computes its own result and no handler mutates ledger
//! state.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::{
    AppState, Error,
    models::{
        CategoryTotal, DashboardSummary, MonthYear, MonthlyBalance, MonthlyCategoryGroup,
        TransactionType, month_label,
    },
    stores::{CampaignStore, TransactionStore},
    timezone,
};

/// How many monthly buckets the dashboard reports.
const MONTHLY_BALANCE_WINDOW: usize = 3;

/// Which months the dashboard's monthly balance list covers.
///
/// The two policies differ in where the buckets come from and whether the
/// saldo carries across months; see [ledger_monthly_balances] and
/// [calendar_window_balances].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceWindow {
    /// Buckets are the months present in the ledger, with a running saldo
    /// carried forward between them.
    #[default]
    Ledger,
    /// Buckets are the current calendar month and the two before it, with
    /// no carry; absent months appear with zero totals.
    Calendar,
}

/// Build the dashboard summary: grand totals over the entire ledger plus
/// the windowed monthly balance list.
///
/// The grand totals always cover the whole ledger regardless of which
/// months the balance list reports, so `total_balance` is exactly
/// `total_income - total_expense`.
pub fn build_dashboard_summary<T>(
    store: &T,
    window: BalanceWindow,
    today: Date,
) -> Result<DashboardSummary, Error>
where
    T: TransactionStore,
{
    let total_income = store.sum_amount(TransactionType::Income, None)?;
    let total_expense = store.sum_amount(TransactionType::Expense, None)?;

    let monthly_balance = match window {
        BalanceWindow::Ledger => ledger_monthly_balances(store)?,
        BalanceWindow::Calendar => calendar_window_balances(store, today)?,
    };

    Ok(DashboardSummary {
        total_balance: total_income - total_expense,
        total_income,
        total_expense,
        monthly_balance,
    })
}

/// Build monthly balances from the months present in the ledger, carrying a
/// running saldo forward.
///
/// The saldo is cumulative, so the walk must be ascending in time even
/// though the result is presented newest first: computing the carry against
/// a descending walk would silently invert it. Only after the full
/// ascending walk is the sequence reversed and truncated to the
/// [MONTHLY_BALANCE_WINDOW] most recent buckets.
pub fn ledger_monthly_balances<T>(store: &T) -> Result<Vec<MonthlyBalance>, Error>
where
    T: TransactionStore,
{
    // Ascending by (year, month), per the store contract.
    let month_years = store.distinct_month_years()?;

    let mut balances = Vec::with_capacity(month_years.len());
    let mut prev_saldo = 0.0;

    for month_year in month_years {
        let income = store.sum_amount(TransactionType::Income, Some(month_year))?;
        let expense = store.sum_amount(TransactionType::Expense, Some(month_year))?;
        let saldo = prev_saldo + income - expense;

        balances.push(MonthlyBalance {
            month: month_year.month.to_string(),
            year: month_year.year,
            income,
            expense,
            prev_saldo: Some(prev_saldo),
            saldo,
        });

        prev_saldo = saldo;
    }

    balances.reverse();
    balances.truncate(MONTHLY_BALANCE_WINDOW);

    Ok(balances)
}

/// Build monthly balances for a fixed window of the [MONTHLY_BALANCE_WINDOW]
/// calendar months ending at `today`'s month, current month first.
///
/// There is no cross-month carry: each bucket's saldo is simply its income
/// minus its expense, and months with no transactions appear with zero
/// totals.
pub fn calendar_window_balances<T>(store: &T, today: Date) -> Result<Vec<MonthlyBalance>, Error>
where
    T: TransactionStore,
{
    let mut balances = Vec::with_capacity(MONTHLY_BALANCE_WINDOW);
    let mut month_year = MonthYear::from(today);

    for _ in 0..MONTHLY_BALANCE_WINDOW {
        let income = store.sum_amount(TransactionType::Income, Some(month_year))?;
        let expense = store.sum_amount(TransactionType::Expense, Some(month_year))?;

        balances.push(MonthlyBalance {
            month: month_year.month.to_string(),
            year: month_year.year,
            income,
            expense,
            prev_saldo: None,
            saldo: income - expense,
        });

        month_year = month_year.previous();
    }

    Ok(balances)
}

/// Sum the category fan-out of every `transaction_type` transaction in the
/// ledger into per-category totals.
///
/// Each transaction contributes its full amount to each of its categories,
/// so the summed totals may exceed the ledger total. Categories are
/// returned in label order for determinism.
pub fn flat_category_totals<T>(
    store: &T,
    transaction_type: TransactionType,
) -> Result<Vec<CategoryTotal>, Error>
where
    T: TransactionStore,
{
    let rows = store.category_fanout(transaction_type, None)?;

    let mut totals = BTreeMap::new();
    for row in rows {
        *totals.entry(row.category).or_insert(0.0) += row.amount;
    }

    Ok(totals
        .into_iter()
        .map(|(category, total)| CategoryTotal { category, total })
        .collect())
}

/// Build the monthly expense-per-category matrix for the trailing
/// [MONTHLY_BALANCE_WINDOW] calendar months.
///
/// Expenses whose `transaction_at` falls between the first day of the month
/// two months before `today`'s month and `today` are fanned out per
/// category, then grouped by `YYYY-MM` month label and summed per
/// (month, category). Months are sorted ascending before returning so the
/// grouping order is deterministic; months without expenses are omitted.
pub fn monthly_category_matrix<T>(
    store: &T,
    today: Date,
) -> Result<Vec<MonthlyCategoryGroup>, Error>
where
    T: TransactionStore,
{
    let start_month = MonthYear::from(today).previous().previous();
    let window_start = Date::from_calendar_date(start_month.year, start_month.month, 1)
        .map_err(|error| Error::InvalidDate(error.to_string()))?;

    let rows = store.category_fanout(TransactionType::Expense, Some(window_start..=today))?;

    let mut grouped: BTreeMap<String, BTreeMap<_, f64>> = BTreeMap::new();
    for row in rows {
        *grouped
            .entry(month_label(row.transaction_at))
            .or_default()
            .entry(row.category)
            .or_insert(0.0) += row.amount;
    }

    Ok(grouped
        .into_iter()
        .map(|(month, categories)| MonthlyCategoryGroup {
            month,
            categories: categories
                .into_iter()
                .map(|(category, total)| CategoryTotal { category, total })
                .collect(),
        })
        .collect())
}

/// The query parameters accepted by the dashboard summary endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    /// Selects the monthly balance policy; defaults to the ledger-driven
    /// running-saldo window.
    #[serde(default)]
    pub window: BalanceWindow,
}

fn local_today<T, C>(state: &AppState<T, C>) -> Date
where
    T: TransactionStore + Clone + Send + Sync,
    C: CampaignStore + Clone + Send + Sync,
{
    let offset = timezone::get_local_offset(&state.local_timezone).unwrap_or(UtcOffset::UTC);

    OffsetDateTime::now_utc().to_offset(offset).date()
}

/// Serve the dashboard summary.
pub async fn get_dashboard<T, C>(
    State(state): State<AppState<T, C>>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<DashboardSummary>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
    C: CampaignStore + Clone + Send + Sync,
{
    let today = local_today(&state);
    let summary = build_dashboard_summary(&state.transaction_store, params.window, today)?;

    Ok(Json(summary))
}

/// Serve the flat expense-per-category breakdown (bar chart).
pub async fn get_bar_chart<T, C>(
    State(state): State<AppState<T, C>>,
) -> Result<Json<Vec<CategoryTotal>>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
    C: CampaignStore + Clone + Send + Sync,
{
    let totals = flat_category_totals(&state.transaction_store, TransactionType::Expense)?;

    Ok(Json(totals))
}

/// Serve the flat income-per-category breakdown (donut chart).
pub async fn get_donut_chart<T, C>(
    State(state): State<AppState<T, C>>,
) -> Result<Json<Vec<CategoryTotal>>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
    C: CampaignStore + Clone + Send + Sync,
{
    let totals = flat_category_totals(&state.transaction_store, TransactionType::Income)?;

    Ok(Json(totals))
}

/// The monthly matrix response envelope.
#[derive(Debug, serde::Serialize)]
pub struct MonthlyMatrixResponse {
    /// One group per month in the window, ascending by month.
    pub months: Vec<MonthlyCategoryGroup>,
}

/// Serve the monthly expense-per-category matrix.
pub async fn get_monthly_bar_chart<T, C>(
    State(state): State<AppState<T, C>>,
) -> Result<Json<MonthlyMatrixResponse>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
    C: CampaignStore + Clone + Send + Sync,
{
    let today = local_today(&state);
    let months = monthly_category_matrix(&state.transaction_store, today)?;

    Ok(Json(MonthlyMatrixResponse { months }))
}

#[cfg(test)]
mod dashboard_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::{Date, macros::date};

    use crate::{
        db::initialize,
        models::{TransactionBuilder, TransactionType},
        stores::{TransactionStore, sqlite::SQLiteTransactionStore},
    };

    use super::{
        BalanceWindow, build_dashboard_summary, calendar_window_balances, flat_category_totals,
        ledger_monthly_balances, monthly_category_matrix,
    };

    fn get_test_store() -> SQLiteTransactionStore {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        SQLiteTransactionStore::new(Arc::new(Mutex::new(connection)))
    }

    fn insert(
        store: &mut SQLiteTransactionStore,
        transaction_type: TransactionType,
        amount: f64,
        labels: &[&str],
        transaction_at: Date,
    ) {
        let builder = TransactionBuilder::new(transaction_type, amount)
            .unwrap()
            .categories(labels.iter().map(|label| label.to_string()).collect())
            .unwrap()
            .transaction_at(transaction_at);

        store.create(builder).unwrap();
    }

    #[test]
    fn summary_of_empty_ledger_is_all_zero() {
        let store = get_test_store();

        let summary =
            build_dashboard_summary(&store, BalanceWindow::Ledger, date!(2025 - 03 - 15)).unwrap();

        assert_eq!(summary.total_income, 0.0);
        assert_eq!(summary.total_expense, 0.0);
        assert_eq!(summary.total_balance, 0.0);
        assert!(summary.monthly_balance.is_empty());
    }

    #[test]
    fn summary_totals_cover_entire_ledger() {
        let mut store = get_test_store();
        // Spread over more months than the dashboard window shows.
        for month in 1..=6 {
            insert(
                &mut store,
                TransactionType::Income,
                100.0,
                &[],
                Date::from_calendar_date(2025, time::Month::try_from(month).unwrap(), 5).unwrap(),
            );
        }
        insert(
            &mut store,
            TransactionType::Expense,
            150.0,
            &[],
            date!(2025 - 06 - 20),
        );

        let summary =
            build_dashboard_summary(&store, BalanceWindow::Ledger, date!(2025 - 06 - 30)).unwrap();

        assert_eq!(summary.total_income, 600.0);
        assert_eq!(summary.total_expense, 150.0);
        assert_eq!(
            summary.total_balance,
            summary.total_income - summary.total_expense
        );
        // The window still only reports the 3 most recent months.
        assert_eq!(summary.monthly_balance.len(), 3);
    }

    #[test]
    fn ledger_balances_carry_saldo_forward() {
        let mut store = get_test_store();
        insert(
            &mut store,
            TransactionType::Income,
            500.0,
            &[],
            date!(2025 - 01 - 10),
        );
        insert(
            &mut store,
            TransactionType::Expense,
            200.0,
            &[],
            date!(2025 - 02 - 10),
        );

        let balances = ledger_monthly_balances(&store).unwrap();

        // Newest first: February carries January's saldo.
        assert_eq!(balances.len(), 2);

        let february = &balances[0];
        assert_eq!(february.month, "February");
        assert_eq!(february.year, 2025);
        assert_eq!(february.income, 0.0);
        assert_eq!(february.expense, 200.0);
        assert_eq!(february.prev_saldo, Some(500.0));
        assert_eq!(february.saldo, 300.0);

        let january = &balances[1];
        assert_eq!(january.month, "January");
        assert_eq!(january.income, 500.0);
        assert_eq!(january.expense, 0.0);
        assert_eq!(january.prev_saldo, Some(0.0));
        assert_eq!(january.saldo, 500.0);
    }

    #[test]
    fn ledger_balances_satisfy_saldo_recurrence() {
        let mut store = get_test_store();
        let months = [
            (date!(2024 - 11 - 05), 300.0, 100.0),
            (date!(2024 - 12 - 05), 0.0, 50.0),
            (date!(2025 - 01 - 05), 400.0, 0.0),
            (date!(2025 - 02 - 05), 100.0, 250.0),
        ];
        for (day, income, expense) in months {
            if income > 0.0 {
                insert(&mut store, TransactionType::Income, income, &[], day);
            }
            if expense > 0.0 {
                insert(&mut store, TransactionType::Expense, expense, &[], day);
            }
        }

        let balances = ledger_monthly_balances(&store).unwrap();

        // Walking the returned (newest first) list backwards is ascending
        // chronological order; each saldo must equal the previous saldo
        // plus the bucket's net.
        for bucket in balances.iter().rev() {
            let prev = bucket.prev_saldo.unwrap();
            assert_eq!(bucket.saldo, prev + bucket.income - bucket.expense);
        }

        // Truncated to the 3 most recent of the 4 months present, and the
        // carry still includes the truncated November bucket.
        assert_eq!(balances.len(), 3);
        assert_eq!(balances[0].month, "February");
        assert_eq!(balances[0].saldo, 300.0 - 100.0 - 50.0 + 400.0 + 100.0 - 250.0);
    }

    #[test]
    fn calendar_window_fills_absent_months_with_zero() {
        let mut store = get_test_store();
        insert(
            &mut store,
            TransactionType::Income,
            500.0,
            &[],
            date!(2025 - 03 - 10),
        );

        let balances = calendar_window_balances(&store, date!(2025 - 03 - 15)).unwrap();

        // Exactly 3 entries, current month first, no carry.
        assert_eq!(balances.len(), 3);
        assert_eq!(balances[0].month, "March");
        assert_eq!(balances[0].saldo, 500.0);
        assert_eq!(balances[0].prev_saldo, None);
        assert_eq!(balances[1].month, "February");
        assert_eq!(balances[1].income, 0.0);
        assert_eq!(balances[1].saldo, 0.0);
        assert_eq!(balances[2].month, "January");
        assert_eq!(balances[2].saldo, 0.0);
    }

    #[test]
    fn calendar_window_crosses_year_boundary() {
        let store = get_test_store();

        let balances = calendar_window_balances(&store, date!(2025 - 01 - 20)).unwrap();

        assert_eq!(balances[0].month, "January");
        assert_eq!(balances[0].year, 2025);
        assert_eq!(balances[1].month, "December");
        assert_eq!(balances[1].year, 2024);
        assert_eq!(balances[2].month, "November");
        assert_eq!(balances[2].year, 2024);
    }

    #[test]
    fn flat_totals_fan_out_full_amount_to_each_category() {
        let mut store = get_test_store();
        insert(
            &mut store,
            TransactionType::Expense,
            100.0,
            &["food", "snacks"],
            date!(2025 - 01 - 15),
        );
        insert(
            &mut store,
            TransactionType::Expense,
            40.0,
            &["food"],
            date!(2025 - 02 - 15),
        );
        insert(
            &mut store,
            TransactionType::Income,
            999.0,
            &["wages"],
            date!(2025 - 02 - 16),
        );

        let totals = flat_category_totals(&store, TransactionType::Expense).unwrap();

        // Label order; the 100 counts fully towards both food and snacks.
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].category.as_ref(), "food");
        assert_eq!(totals[0].total, 140.0);
        assert_eq!(totals[1].category.as_ref(), "snacks");
        assert_eq!(totals[1].total, 100.0);

        // The fanned-out sum (240) exceeds the expense ledger total (140),
        // which is expected of a fan-out.
        let fanned_sum: f64 = totals.iter().map(|total| total.total).sum();
        assert!(fanned_sum > 140.0);
    }

    #[test]
    fn monthly_matrix_groups_by_month_then_category() {
        let mut store = get_test_store();
        let today = date!(2025 - 03 - 15);

        insert(
            &mut store,
            TransactionType::Expense,
            100.0,
            &["food", "snacks"],
            date!(2025 - 02 - 10),
        );
        insert(
            &mut store,
            TransactionType::Expense,
            60.0,
            &["food"],
            date!(2025 - 03 - 05),
        );
        // Outside the trailing window; must not appear.
        insert(
            &mut store,
            TransactionType::Expense,
            999.0,
            &["food"],
            date!(2024 - 11 - 05),
        );
        // Income never appears in the expense matrix.
        insert(
            &mut store,
            TransactionType::Income,
            500.0,
            &["wages"],
            date!(2025 - 03 - 06),
        );

        let months = monthly_category_matrix(&store, today).unwrap();

        // Months ascending; January has no expenses and is omitted.
        assert_eq!(months.len(), 2);

        assert_eq!(months[0].month, "2025-02");
        assert_eq!(months[0].categories.len(), 2);
        assert_eq!(months[0].categories[0].category.as_ref(), "food");
        assert_eq!(months[0].categories[0].total, 100.0);
        assert_eq!(months[0].categories[1].category.as_ref(), "snacks");
        assert_eq!(months[0].categories[1].total, 100.0);

        assert_eq!(months[1].month, "2025-03");
        assert_eq!(months[1].categories.len(), 1);
        assert_eq!(months[1].categories[0].total, 60.0);
    }

    #[test]
    fn monthly_matrix_of_empty_ledger_is_empty() {
        let store = get_test_store();

        let months = monthly_category_matrix(&store, date!(2025 - 03 - 15)).unwrap();

        assert!(months.is_empty());
    }
}
