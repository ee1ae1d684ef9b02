//! Startup bootstrap for the application's SQLite database.

use std::path::Path;

use rusqlite::{Connection, TransactionBehavior, Transaction as SqlTransaction};

use crate::{Error, transaction::create_transaction_table};

/// Open (or create) the SQLite database at `path`.
///
/// # Errors
/// Returns an [Error::SqlError] if the file cannot be opened as a database.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection, Error> {
    let connection = Connection::open(path)?;

    Ok(connection)
}

/// Create the tables for the domain models if they do not already exist.
///
/// This is meant to run once at startup. The tables are created with
/// `IF NOT EXISTS`, so an existing schema is left as is and any error that
/// does come back is a real failure (e.g., a read-only or corrupt file) that
/// the caller should treat as fatal.
///
/// # Errors
/// Returns an [Error::SqlError] if the schema could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;

    transaction.commit()?;

    tracing::debug!("database schema is ready");

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();
        let second_run = initialize(&connection);

        assert!(second_run.is_ok(), "got {second_run:?}, want Ok(())");
    }

    #[test]
    fn initialize_fails_on_read_only_database() {
        let connection = Connection::open_in_memory().unwrap();
        connection.pragma_update(None, "query_only", true).unwrap();

        let result = initialize(&connection);

        assert!(result.is_err(), "got {result:?}, want an error");
    }
}
