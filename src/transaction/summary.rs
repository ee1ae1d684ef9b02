//! Income, expense and balance totals over the stored transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    transaction::{Kind, Transaction, get_all_transactions},
};

/// Totals derived from a list of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// The sum of all income amounts.
    pub total_income: i64,
    /// The sum of all expense amounts.
    pub total_expense: i64,
    /// `total_income - total_expense`.
    pub balance: i64,
    /// How many transactions were summed.
    pub transaction_count: usize,
}

impl Summary {
    /// Sum `transactions` by kind in a single pass.
    ///
    /// Sums saturate at the bounds of `i64` instead of overflowing.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let (total_income, total_expense) =
            transactions
                .iter()
                .fold((0i64, 0i64), |(income, expense), transaction| {
                    match transaction.kind {
                        Kind::Income => (income.saturating_add(transaction.amount), expense),
                        Kind::Expense => (income, expense.saturating_add(transaction.amount)),
                    }
                });

        Self {
            total_income,
            total_expense,
            balance: total_income.saturating_sub(total_expense),
            transaction_count: transactions.len(),
        }
    }
}

/// The state needed to summarise transactions.
#[derive(Debug, Clone)]
pub struct SummaryState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

const SUMMARY_FAILED: &str = "Could not calculate the transaction summary.";

/// A route handler for the income, expense and balance totals.
pub async fn get_summary_endpoint(State(state): State<SummaryState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response(SUMMARY_FAILED);
        }
    };

    match get_all_transactions(&connection) {
        Ok(transactions) => Json(Summary::from_transactions(&transactions)).into_response(),
        Err(error) => error.into_json_response(SUMMARY_FAILED),
    }
}
