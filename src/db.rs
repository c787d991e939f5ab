//! This module defines traits for setting up the application's database and
//! mapping rows to domain types.

use rusqlite::{Connection, Row};

use crate::stores::sqlite::{SQLiteCampaignStore, SQLiteTransactionStore};

/// Create the table(s) for a store in the database.
pub trait CreateTable {
    /// Create the table(s) for storing this store's model.
    ///
    /// # Errors
    /// Returns an error if the table cannot be created or the database
    /// cannot be accessed.
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error>;
}

/// Map a SQL row to a concrete type.
pub trait MapRow {
    /// The type the row is mapped to.
    type ReturnType;

    /// Convert a row into `ReturnType`, reading columns starting at index
    /// zero.
    ///
    /// # Errors
    /// Returns an error if a column is missing or contains an unexpected
    /// type.
    fn map_row(row: &Row) -> Result<Self::ReturnType, rusqlite::Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a row into `ReturnType`, reading columns starting at
    /// `offset`.
    ///
    /// # Errors
    /// Returns an error if a column is missing or contains an unexpected
    /// type.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error>;
}

/// Initialize the database by creating the tables for the domain models.
///
/// # Errors
/// Returns an error if a table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    SQLiteTransactionStore::create_table(connection)?;
    SQLiteCampaignStore::create_table(connection)?;

    Ok(())
}
