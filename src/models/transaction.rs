//! This file defines the type `Transaction`, the core type of the ledger.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    models::{Categories, CategoryName, DatabaseID},
};

/// Whether a transaction brought money in or sent money out.
///
/// The amount of a transaction is always non-negative; the direction of the
/// money flow is carried by this type. The Indonesian markers used by the
/// original data set (`pemasukan`/`pengeluaran`) are accepted as aliases
/// when deserializing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in, e.g. wages.
    #[serde(alias = "pemasukan")]
    Income,
    /// Money going out, e.g. groceries.
    #[serde(alias = "pengeluaran")]
    Expense,
}

impl TransactionType {
    /// The marker stored in the database for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Parse a type marker, accepting both the English and the original
    /// Indonesian spellings.
    pub fn parse(value: &str) -> Result<Self, Error> {
        match value {
            "income" | "pemasukan" => Ok(TransactionType::Income),
            "expense" | "pengeluaran" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_string())),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build]. Transactions are
/// immutable once created; the only lifecycle operations are insertion and
/// hard deletion by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction, assigned by the store.
    pub id: DatabaseID,
    /// Whether the transaction is an income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The amount of money spent or earned. Always non-negative.
    pub amount: f64,
    /// Up to three category labels, each receiving the full amount during
    /// aggregation.
    pub categories: Categories,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The logical date the transaction pertains to.
    pub transaction_at: Date,
    /// When the record was inserted.
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder::new] for discoverability.
    pub fn build(
        transaction_type: TransactionType,
        amount: f64,
    ) -> Result<TransactionBuilder, Error> {
        TransactionBuilder::new(transaction_type, amount)
    }

    /// Expand the transaction's category list into one `(category, amount)`
    /// pair per label, each carrying the full amount.
    ///
    /// A transaction with categories `["food", "snacks"]` and amount 100
    /// contributes 100 to both `food` and `snacks`; the summed totals across
    /// categories may exceed the ledger total, which is expected.
    pub fn fanout(&self) -> impl Iterator<Item = (&CategoryName, f64)> {
        self.categories.iter().map(|name| (name, self.amount))
    }
}

/// Builder for creating a new [Transaction].
///
/// Finalize the builder by passing it to
/// [TransactionStore::create](crate::stores::TransactionStore::create),
/// which assigns the ID.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionBuilder {
    /// Whether the transaction is an income or an expense.
    pub transaction_type: TransactionType,
    /// The amount of money spent or earned. Validated to be non-negative.
    pub amount: f64,
    /// The category labels for the transaction.
    pub categories: Categories,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The logical date the transaction pertains to. Defaults to today.
    pub transaction_at: Date,
    /// The record insertion timestamp. Defaults to the current time.
    pub created_at: OffsetDateTime,
}

impl TransactionBuilder {
    /// Start building a transaction.
    ///
    /// # Errors
    /// This function will return an [Error::NegativeAmount] if `amount` is
    /// less than zero.
    pub fn new(transaction_type: TransactionType, amount: f64) -> Result<Self, Error> {
        if amount < 0.0 {
            return Err(Error::NegativeAmount(amount));
        }

        let now = OffsetDateTime::now_utc();

        Ok(Self {
            transaction_type,
            amount,
            categories: Categories::default(),
            description: String::new(),
            transaction_at: now.date(),
            created_at: now,
        })
    }

    /// Set the category labels for the transaction.
    ///
    /// # Errors
    /// This function will return an error if more than
    /// [MAX_CATEGORIES](crate::models::MAX_CATEGORIES) labels are given or
    /// any label is empty. Validation happens here, before anything is
    /// written to the store.
    pub fn categories(mut self, labels: Vec<String>) -> Result<Self, Error> {
        self.categories = Categories::new(labels)?;
        Ok(self)
    }

    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Set the logical date of the transaction.
    pub fn transaction_at(mut self, date: Date) -> Self {
        self.transaction_at = date;
        self
    }

    /// Set the insertion timestamp, overriding the default of now.
    pub fn created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = created_at;
        self
    }
}

#[cfg(test)]
mod transaction_tests {
    use time::macros::date;

    use crate::Error;

    use super::{Transaction, TransactionType};

    #[test]
    fn build_fails_on_negative_amount() {
        let result = Transaction::build(TransactionType::Expense, -12.5);

        assert_eq!(result.err(), Some(Error::NegativeAmount(-12.5)));
    }

    #[test]
    fn build_fails_on_four_categories() {
        let labels = ["a", "b", "c", "d"].map(String::from).to_vec();

        let result = Transaction::build(TransactionType::Expense, 10.0)
            .unwrap()
            .categories(labels);

        assert_eq!(result.err(), Some(Error::TooManyCategories(4)));
    }

    #[test]
    fn build_sets_defaults() {
        let builder = Transaction::build(TransactionType::Income, 500.0).unwrap();

        assert!(builder.categories.is_empty());
        assert_eq!(builder.description, "");
        assert_eq!(builder.transaction_at, builder.created_at.date());
    }

    #[test]
    fn fanout_duplicates_full_amount_per_category() {
        let transaction = Transaction {
            id: 1,
            transaction_type: TransactionType::Expense,
            amount: 100.0,
            categories: crate::models::Categories::new(vec![
                "food".to_owned(),
                "snacks".to_owned(),
            ])
            .unwrap(),
            description: String::new(),
            transaction_at: date!(2025 - 01 - 15),
            created_at: time::OffsetDateTime::now_utc(),
        };

        let rows: Vec<_> = transaction.fanout().collect();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|(_, amount)| *amount == 100.0));
    }

    #[test]
    fn parse_accepts_indonesian_aliases() {
        assert_eq!(
            TransactionType::parse("pemasukan"),
            Ok(TransactionType::Income)
        );
        assert_eq!(
            TransactionType::parse("pengeluaran"),
            Ok(TransactionType::Expense)
        );
        assert_eq!(
            TransactionType::parse("transfer"),
            Err(Error::InvalidTransactionType("transfer".to_string()))
        );
    }
}
