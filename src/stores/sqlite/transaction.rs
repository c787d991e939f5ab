//! Implements a SQLite backed transaction store.
use std::{
    ops::RangeInclusive,
    sync::{Arc, Mutex},
};

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use time::{Date, Month};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{Categories, DatabaseID, MonthYear, Transaction, TransactionBuilder, TransactionType},
    stores::{
        TransactionStore,
        transaction::{FanoutRow, SortOrder, TransactionFilter, TransactionQuery},
    },
};

const COLUMNS: &str = "id, type, amount, categories, description, transaction_at, created_at";

/// Stores transactions in a SQLite database.
///
/// Category labels are persisted as a JSON array column; the category
/// fan-out is performed in Rust by expanding each selected transaction's
/// labels, so a transaction with 3 categories contributes 3 rows to a
/// fan-out query.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

/// Append the WHERE clause parts for `filter`, pushing parameters onto
/// `query_parameters` with matching `?N` placeholders.
fn build_where_clause(filter: &TransactionFilter, query_parameters: &mut Vec<Value>) -> Vec<String> {
    let mut where_clause_parts = vec![];

    if let Some(transaction_type) = filter.transaction_type {
        where_clause_parts.push(format!("type = ?{}", query_parameters.len() + 1));
        query_parameters.push(Value::Text(transaction_type.as_str().to_string()));
    }

    if let Some(category) = &filter.category {
        where_clause_parts.push(format!(
            "EXISTS (SELECT 1 FROM json_each(\"transaction\".categories) \
             WHERE json_each.value = ?{})",
            query_parameters.len() + 1
        ));
        query_parameters.push(Value::Text(category.to_string()));
    }

    if let Some(date_range) = &filter.date_range {
        where_clause_parts.push(format!(
            "transaction_at BETWEEN ?{} AND ?{}",
            query_parameters.len() + 1,
            query_parameters.len() + 2,
        ));
        query_parameters.push(Value::Text(date_range.start().to_string()));
        query_parameters.push(Value::Text(date_range.end().to_string()));
    }

    if let Some(note) = &filter.note {
        where_clause_parts.push(format!("description LIKE ?{}", query_parameters.len() + 1));
        query_parameters.push(Value::Text(format!("%{note}%")));
    }

    if let Some(min_amount) = filter.min_amount {
        where_clause_parts.push(format!("amount >= ?{}", query_parameters.len() + 1));
        query_parameters.push(Value::Real(min_amount));
    }

    if let Some(max_amount) = filter.max_amount {
        where_clause_parts.push(format!("amount <= ?{}", query_parameters.len() + 1));
        query_parameters.push(Value::Real(max_amount));
    }

    where_clause_parts
}

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// The builder has already validated the amount and category list, so
    /// nothing is written for invalid input.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an
    /// unexpected SQL error.
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        let categories_json = serde_json::to_string(&builder.categories)
            .map_err(|error| Error::SqlError(rusqlite::Error::ToSqlConversionFailure(
                Box::new(error),
            )))?;

        let transaction = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "INSERT INTO \"transaction\" \
                 (type, amount, categories, description, transaction_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                (
                    builder.transaction_type.as_str(),
                    builder.amount,
                    categories_json,
                    &builder.description,
                    builder.transaction_at,
                    builder.created_at,
                ),
                Self::map_row,
            )?;

        Ok(transaction)
    }

    /// Retrieve a transaction in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid transaction,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: DatabaseID) -> Result<Transaction, Error> {
        let transaction = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {COLUMNS} FROM \"transaction\" WHERE id = :id"
            ))?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(transaction)
    }

    /// Delete the transaction with `id` from the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DeleteMissingTransaction] if `id` does not refer to a
    ///   transaction in the database,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: DatabaseID) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .lock()
            .unwrap()
            .execute("DELETE FROM \"transaction\" WHERE id = ?1", (id,))?;

        if rows_affected == 0 {
            return Err(Error::DeleteMissingTransaction);
        }

        Ok(())
    }

    /// Query for transactions in the database.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL
    /// error.
    fn get_query(&self, query: TransactionQuery) -> Result<Vec<Transaction>, Error> {
        let mut query_string_parts =
            vec![format!("SELECT {COLUMNS} FROM \"transaction\"")];
        let mut query_parameters = vec![];

        let where_clause_parts = build_where_clause(&query.filter, &mut query_parameters);

        if !where_clause_parts.is_empty() {
            query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));
        }

        match query.sort_created {
            Some(SortOrder::Ascending) => {
                query_string_parts.push("ORDER BY created_at ASC".to_string())
            }
            Some(SortOrder::Descending) => {
                query_string_parts.push("ORDER BY created_at DESC".to_string())
            }
            None => {}
        }

        if let Some(limit) = query.limit {
            query_string_parts.push(format!("LIMIT {limit} OFFSET {}", query.offset));
        }

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        self.connection
            .lock()
            .unwrap()
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect()
    }

    /// The number of transactions matching `filter`.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL
    /// error.
    fn count(&self, filter: &TransactionFilter) -> Result<u64, Error> {
        let mut query_parameters = vec![];
        let where_clause_parts = build_where_clause(filter, &mut query_parameters);

        let mut query_string = "SELECT COUNT(id) FROM \"transaction\"".to_string();
        if !where_clause_parts.is_empty() {
            query_string += " WHERE ";
            query_string += &where_clause_parts.join(" AND ");
        }

        self.connection
            .lock()
            .unwrap()
            .query_row(
                &query_string,
                params_from_iter(query_parameters.iter()),
                |row| row.get::<_, i64>(0).map(|count| count as u64),
            )
            .map_err(|error| error.into())
    }

    /// The summed amount of the transactions matching `filter`.
    ///
    /// The sum is coalesced to zero in SQL, so an empty result set yields
    /// `0.0` rather than an error.
    fn sum_filtered(&self, filter: &TransactionFilter) -> Result<f64, Error> {
        let mut query_parameters = vec![];
        let where_clause_parts = build_where_clause(filter, &mut query_parameters);

        let mut query_string = "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\"".to_string();
        if !where_clause_parts.is_empty() {
            query_string += " WHERE ";
            query_string += &where_clause_parts.join(" AND ");
        }

        self.connection
            .lock()
            .unwrap()
            .query_row(
                &query_string,
                params_from_iter(query_parameters.iter()),
                |row| row.get(0),
            )
            .map_err(|error| error.into())
    }

    /// The summed amount of all transactions of `transaction_type`,
    /// optionally restricted to one month bucket.
    ///
    /// The sum is coalesced to zero in SQL, so a month with no transactions
    /// yields `0.0` rather than an error.
    fn sum_amount(
        &self,
        transaction_type: TransactionType,
        month_year: Option<MonthYear>,
    ) -> Result<f64, Error> {
        let connection = self.connection.lock().unwrap();

        let sum = match month_year {
            Some(month_year) => connection.query_row(
                "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\"
                 WHERE type = ?1
                    AND CAST(strftime('%m', transaction_at) AS INTEGER) = ?2
                    AND CAST(strftime('%Y', transaction_at) AS INTEGER) = ?3",
                (
                    transaction_type.as_str(),
                    month_year.month as u8,
                    month_year.year,
                ),
                |row| row.get(0),
            )?,
            None => connection.query_row(
                "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\" WHERE type = ?1",
                (transaction_type.as_str(),),
                |row| row.get(0),
            )?,
        };

        Ok(sum)
    }

    /// The distinct month buckets present in the ledger, ascending by
    /// `(year, month)`.
    fn distinct_month_years(&self) -> Result<Vec<MonthYear>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT DISTINCT
                    CAST(strftime('%m', transaction_at) AS INTEGER) AS month,
                    CAST(strftime('%Y', transaction_at) AS INTEGER) AS year
                 FROM \"transaction\"
                 ORDER BY year, month",
            )?
            .query_map([], |row| {
                let month: u8 = row.get(0)?;
                let month = Month::try_from(month).map_err(|error| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Integer,
                        Box::new(error),
                    )
                })?;

                Ok(MonthYear {
                    month,
                    year: row.get(1)?,
                })
            })?
            .map(|maybe_month_year| maybe_month_year.map_err(Error::SqlError))
            .collect()
    }

    /// The category fan-out of all transactions of `transaction_type`,
    /// optionally restricted to a `transaction_at` range.
    ///
    /// Transactions are selected in SQL and expanded row-per-category in
    /// Rust via [Transaction::fanout].
    fn category_fanout(
        &self,
        transaction_type: TransactionType,
        date_range: Option<RangeInclusive<Date>>,
    ) -> Result<Vec<FanoutRow>, Error> {
        let transactions = self.get_query(TransactionQuery {
            filter: TransactionFilter {
                transaction_type: Some(transaction_type),
                date_range,
                ..Default::default()
            },
            ..Default::default()
        })?;

        let rows = transactions
            .iter()
            .flat_map(|transaction| {
                transaction.fanout().map(|(category, amount)| FanoutRow {
                    transaction_at: transaction.transaction_at,
                    category: category.clone(),
                    amount,
                })
            })
            .collect();

        Ok(rows)
    }

    /// The `limit` largest transactions by amount, largest first.
    fn top_by_amount(&self, limit: u64) -> Result<Vec<Transaction>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {COLUMNS} FROM \"transaction\" ORDER BY amount DESC LIMIT ?1"
            ))?
            .query_map((limit as i64,), Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect()
    }
}

impl CreateTable for SQLiteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    type TEXT NOT NULL,
                    amount REAL NOT NULL,
                    categories TEXT NOT NULL,
                    description TEXT NOT NULL,
                    transaction_at TEXT NOT NULL,
                    created_at TEXT NOT NULL
                    )",
            (),
        )?;

        // Ensure the sequence starts at 1
        connection.execute(
            "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteTransactionStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;

        let type_marker: String = row.get(offset + 1)?;
        let transaction_type = TransactionType::parse(&type_marker).map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(
                offset + 1,
                rusqlite::types::Type::Text,
                Box::new(error),
            )
        })?;

        let amount = row.get(offset + 2)?;

        let categories_json: String = row.get(offset + 3)?;
        let labels: Vec<String> = serde_json::from_str(&categories_json).map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(
                offset + 3,
                rusqlite::types::Type::Text,
                Box::new(error),
            )
        })?;

        Ok(Transaction {
            id,
            transaction_type,
            amount,
            categories: Categories::new_unchecked(labels),
            description: row.get(offset + 4)?,
            transaction_at: row.get(offset + 5)?,
            created_at: row.get(offset + 6)?,
        })
    }
}
