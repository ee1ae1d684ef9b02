//! Defines the endpoint for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    database_id::TransactionId,
    transaction::{create_transaction, payload::TransactionPayload},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The response body for a newly created transaction.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    /// The ID assigned to the new transaction.
    pub id: TransactionId,
    /// A human readable confirmation.
    pub message: String,
}

const CREATE_FAILED: &str = "Could not add the transaction.";

/// A route handler for creating a new transaction.
///
/// Responds with `201 Created` and the new transaction's ID, or `400 Bad
/// Request` if a field is missing or invalid, in which case nothing is stored.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    payload: Result<Json<TransactionPayload>, JsonRejection>,
) -> Response {
    let new_transaction = match payload
        .map_err(|rejection| Error::InvalidJson(rejection.body_text()))
        .and_then(|Json(payload)| payload.into_new_transaction())
    {
        Ok(new_transaction) => new_transaction,
        Err(error) => {
            tracing::debug!("rejected new transaction: {error}");
            return error.into_json_response(CREATE_FAILED);
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response(CREATE_FAILED);
        }
    };

    match create_transaction(new_transaction, &connection) {
        Ok(transaction) => {
            tracing::info!("created transaction {}", transaction.id);
            (
                StatusCode::CREATED,
                Json(CreatedResponse {
                    id: transaction.id,
                    message: "Transaction added.".to_owned(),
                }),
            )
                .into_response()
        }
        Err(error) => error.into_json_response(CREATE_FAILED),
    }
}
