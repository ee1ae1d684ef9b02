//! Defines the endpoint for listing every transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, transaction::get_all_transactions};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

const LIST_FAILED: &str = "Could not fetch transactions.";

/// A route handler that responds with a JSON array of all transactions, most
/// recent date first.
pub async fn list_transactions_endpoint(State(state): State<ListTransactionsState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response(LIST_FAILED);
        }
    };

    match get_all_transactions(&connection) {
        Ok(transactions) => Json(transactions).into_response(),
        Err(error) => error.into_json_response(LIST_FAILED),
    }
}
