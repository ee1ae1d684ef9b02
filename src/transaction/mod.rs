//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the store functions over the SQLite table
//! - Parsing of transaction JSON from the dashboard and from backup files
//! - The JSON route handlers for listing, creating, deleting, restoring and
//!   exporting transactions, and for the income/expense/balance summary

mod core;
mod create_endpoint;
mod delete_endpoint;
mod export_endpoint;
mod list_endpoint;
mod payload;
mod restore_endpoint;
mod summary;

pub use core::{
    Kind, NewTransaction, Transaction, count_transactions, create_transaction,
    create_transaction_table, delete_transaction, get_all_transactions, replace_all_transactions,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use export_endpoint::export_transactions_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use restore_endpoint::restore_transactions_endpoint;
pub use summary::{Summary, get_summary_endpoint};

#[cfg(test)]
pub use core::get_transaction;
#[cfg(test)]
pub use create_endpoint::CreatedResponse;
#[cfg(test)]
pub use delete_endpoint::MessageResponse;
#[cfg(test)]
pub use export_endpoint::Backup;
