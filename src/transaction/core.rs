//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction brought money in or sent it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Money earned, e.g. a salary payment.
    Income,
    /// Money spent, e.g. groceries.
    Expense,
}

impl Kind {
    /// The text stored in the database and sent to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Income => "income",
            Kind::Expense => "expense",
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = Error;

    /// Parse a kind, ignoring case.
    ///
    /// Backups written by older versions of the dashboard use the Indonesian
    /// labels `pemasukan` (income) and `pengeluaran` (expense), so these are
    /// accepted too.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim().to_lowercase().as_str() {
            "income" | "pemasukan" => Ok(Kind::Income),
            "expense" | "pengeluaran" => Ok(Kind::Expense),
            _ => Err(Error::InvalidKind(text.to_owned())),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether the transaction is income or an expense.
    pub kind: Kind,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money in whole Rupiah.
    pub amount: i64,
    /// When the transaction happened.
    pub date: Date,
}

/// A transaction that has not been stored yet and therefore has no ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Whether the transaction is income or an expense.
    pub kind: Kind,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money in whole Rupiah.
    ///
    /// The dashboard only lets users enter positive amounts, but the store
    /// accepts any value.
    pub amount: i64,
    /// When the transaction happened.
    pub date: Date,
}

impl NewTransaction {
    /// Shortcut for building a [NewTransaction] in code.
    pub fn new(kind: Kind, description: &str, amount: i64, date: Date) -> Self {
        Self {
            kind,
            description: description.to_owned(),
            amount,
            date,
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// Safe to call on a database that already has the table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    // AUTOINCREMENT stops SQLite from handing out the ID of a deleted row again.
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
                description TEXT NOT NULL,
                amount INTEGER NOT NULL,
                date TEXT NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date_id ON \"transaction\"(date, id);",
        (),
    )?;

    Ok(())
}

/// Create a new transaction in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (kind, description, amount, date)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, kind, description, amount, date",
        )?
        .query_row(
            (
                new_transaction.kind.as_str(),
                new_transaction.description,
                new_transaction.amount,
                new_transaction.date,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get every transaction, most recent date first.
///
/// Transactions on the same date are ordered by descending ID, so the most
/// recently added one comes first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, kind, description, amount, date FROM \"transaction\"
             ORDER BY date DESC, id DESC",
        )?
        .query_map([], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
#[cfg(test)]
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare("SELECT id, kind, description, amount, date FROM \"transaction\" WHERE id = :id")?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// The number of rows changed by a statement.
pub type RowsAffected = usize;

/// Delete the transaction with `id`.
///
/// Returns the number of deleted rows, which is zero when no transaction has
/// the given ID.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE id = :id",
            &[(":id", &id)],
        )
        .map_err(Error::from)
}

/// Replace every stored transaction with `new_transactions`.
///
/// The delete and all the inserts run in one SQL transaction. If any insert
/// fails the whole operation is rolled back and the previous transactions are
/// kept. Restored transactions get new IDs.
///
/// Returns the number of transactions inserted.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn replace_all_transactions(
    new_transactions: Vec<NewTransaction>,
    connection: &Connection,
) -> Result<usize, Error> {
    let tx = connection.unchecked_transaction()?;

    let deleted = tx.execute("DELETE FROM \"transaction\"", ())?;

    let mut stmt = tx.prepare(
        "INSERT INTO \"transaction\" (kind, description, amount, date)
         VALUES (?1, ?2, ?3, ?4)",
    )?;

    let mut inserted = 0;

    for new_transaction in new_transactions {
        stmt.execute((
            new_transaction.kind.as_str(),
            new_transaction.description,
            new_transaction.amount,
            new_transaction.date,
        ))?;
        inserted += 1;
    }

    drop(stmt);
    tx.commit()?;

    tracing::info!("replaced {deleted} transactions with {inserted} restored transactions");

    Ok(inserted)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let kind: String = row.get(1)?;
    let kind: Kind = kind.parse().map_err(|error: Error| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(error))
    })?;
    let description = row.get(2)?;
    let amount = row.get(3)?;
    let date = row.get(4)?;

    Ok(Transaction {
        id,
        kind,
        description,
        amount,
        date,
    })
}

// ============================================================================
// TESTS
// ============================================================================
