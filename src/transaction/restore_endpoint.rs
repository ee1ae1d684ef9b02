//! Defines the endpoint for restoring transactions from a backup.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    AppState, Error,
    transaction::{
        NewTransaction, delete_endpoint::MessageResponse, payload::TransactionPayload,
        replace_all_transactions,
    },
};

/// The state needed to restore transactions.
#[derive(Debug, Clone)]
pub struct RestoreState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RestoreState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The body of a restore request, `{"transactions": [...]}`.
#[derive(Debug, Deserialize)]
pub struct RestorePayload {
    #[serde(default)]
    transactions: Option<Value>,
}

const RESTORE_FAILED: &str = "Could not import and restore transactions.";

/// A route handler that replaces every stored transaction with the ones in
/// the request body.
///
/// The whole body is validated before anything is deleted, and the delete and
/// inserts are committed together, so a failed restore leaves the existing
/// transactions untouched.
pub async fn restore_transactions_endpoint(
    State(state): State<RestoreState>,
    payload: Result<Json<RestorePayload>, JsonRejection>,
) -> Response {
    let new_transactions = match payload
        .map_err(|rejection| Error::InvalidJson(rejection.body_text()))
        .and_then(|Json(payload)| parse_restore_payload(payload))
    {
        Ok(new_transactions) => new_transactions,
        Err(error) => {
            tracing::debug!("rejected restore: {error}");
            return error.into_json_response(RESTORE_FAILED);
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response(RESTORE_FAILED);
        }
    };

    let start_time = std::time::Instant::now();

    match replace_all_transactions(new_transactions, &connection) {
        Ok(count) => {
            tracing::info!(
                "restored {count} transactions in {}ms",
                start_time.elapsed().as_millis()
            );
            Json(MessageResponse {
                message: format!("{count} transactions imported and restored."),
            })
            .into_response()
        }
        Err(error) => error.into_json_response(RESTORE_FAILED),
    }
}

fn parse_restore_payload(payload: RestorePayload) -> Result<Vec<NewTransaction>, Error> {
    let records = match payload.transactions {
        Some(Value::Array(records)) => records,
        _ => return Err(Error::InvalidRestorePayload),
    };

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_value::<TransactionPayload>(record)
                .map_err(|error| error.to_string())
                .and_then(|payload| {
                    payload
                        .into_restored_transaction()
                        .map_err(|error| error.to_string())
                })
                .map_err(|reason| Error::InvalidRestoreRecord { index, reason })
        })
        .collect()
}
