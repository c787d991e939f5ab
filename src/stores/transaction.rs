//! Defines the transaction store trait, which doubles as the ledger query
//! adapter for the dashboard aggregation.

use std::ops::RangeInclusive;

use time::Date;

use crate::{
    Error,
    models::{CategoryName, DatabaseID, MonthYear, Transaction, TransactionBuilder,
        TransactionType},
};

/// Handles the creation, retrieval, and aggregation of transactions.
///
/// The aggregation methods (`sum_amount`, `distinct_month_years`,
/// `category_fanout`) form the read interface the dashboard builders are
/// written against, so an alternative backend can be substituted without
/// touching the aggregation logic. Every sum coalesces an empty result set
/// to zero at the query boundary; absence is never reported as an error or
/// a null.
pub trait TransactionStore {
    /// Create a new transaction in the store and assign its ID.
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error>;

    /// Retrieve a transaction from the store by its ID.
    fn get(&self, id: DatabaseID) -> Result<Transaction, Error>;

    /// Delete the transaction with `id`.
    ///
    /// # Errors
    /// Returns [Error::DeleteMissingTransaction] when no transaction has
    /// the given ID, distinct from a retrieval failure.
    fn delete(&mut self, id: DatabaseID) -> Result<(), Error>;

    /// Retrieve transactions from the store in the way defined by `query`.
    fn get_query(&self, query: TransactionQuery) -> Result<Vec<Transaction>, Error>;

    /// The number of transactions matching `filter`, ignoring pagination.
    fn count(&self, filter: &TransactionFilter) -> Result<u64, Error>;

    /// The summed amount of the transactions matching `filter`, ignoring
    /// pagination. Zero when nothing matches.
    fn sum_filtered(&self, filter: &TransactionFilter) -> Result<f64, Error>;

    /// The summed amount of all transactions of `transaction_type`,
    /// optionally restricted to a single month bucket. Zero when nothing
    /// matches.
    fn sum_amount(
        &self,
        transaction_type: TransactionType,
        month_year: Option<MonthYear>,
    ) -> Result<f64, Error>;

    /// The distinct `(month, year)` buckets present in the ledger, sorted
    /// ascending by `(year, month)`.
    fn distinct_month_years(&self) -> Result<Vec<MonthYear>, Error>;

    /// The category fan-out of all transactions of `transaction_type`,
    /// optionally restricted to a `transaction_at` date range.
    ///
    /// One row is returned per transaction-category membership; a
    /// transaction with 3 categories contributes 3 rows, each carrying its
    /// full amount.
    fn category_fanout(
        &self,
        transaction_type: TransactionType,
        date_range: Option<RangeInclusive<Date>>,
    ) -> Result<Vec<FanoutRow>, Error>;

    /// The `limit` largest transactions by amount, largest first.
    fn top_by_amount(&self, limit: u64) -> Result<Vec<Transaction>, Error>;
}

/// One row of a category fan-out query: a single transaction-category
/// membership carrying the transaction's full amount.
#[derive(Clone, Debug, PartialEq)]
pub struct FanoutRow {
    /// The logical date of the transaction the row came from.
    pub transaction_at: Date,
    /// The category label.
    pub category: CategoryName,
    /// The full amount of the transaction.
    pub amount: f64,
}

/// Restricts which transactions a listing or aggregate covers.
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    /// Only include transactions of this type.
    pub transaction_type: Option<TransactionType>,
    /// Only include transactions carrying this category label.
    pub category: Option<CategoryName>,
    /// Only include transactions whose `transaction_at` falls within this
    /// range (inclusive).
    pub date_range: Option<RangeInclusive<Date>>,
    /// Only include transactions whose description contains this text.
    pub note: Option<String>,
    /// Only include transactions with at least this amount.
    pub min_amount: Option<f64>,
    /// Only include transactions with at most this amount.
    pub max_amount: Option<f64>,
}

/// Defines how transactions should be fetched from
/// [TransactionStore::get_query].
#[derive(Clone, Debug, Default)]
pub struct TransactionQuery {
    /// Restricts which transactions are returned.
    pub filter: TransactionFilter,
    /// Selects up to the first N (`limit`) transactions.
    pub limit: Option<u64>,
    /// Skips the first N (`offset`) transactions.
    pub offset: u64,
    /// Orders transactions by insertion time in the order `sort_created`.
    /// None returns transactions in the order they are stored.
    pub sort_created: Option<SortOrder>,
}

/// The order to sort transactions in a [TransactionQuery].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}
