use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    database_id::TransactionId,
    transaction::delete_transaction,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query string for deleting a transaction, e.g. `?id=42`.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    id: Option<String>,
}

/// A response body with only a confirmation message.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// A human readable confirmation.
    pub message: String,
}

const DELETE_FAILED: &str = "Could not delete the transaction.";

/// A route handler for deleting the transaction given by the `id` query parameter.
///
/// Responds with `400 Bad Request` when `id` is missing or not an integer and
/// `404 Not Found` when no transaction has that ID.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            return Error::InvalidQuery(rejection.body_text()).into_json_response(DELETE_FAILED);
        }
    };

    let transaction_id = match parse_id(query.id) {
        Ok(id) => id,
        Err(error) => return error.into_json_response(DELETE_FAILED),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response(DELETE_FAILED);
        }
    };

    match delete_transaction(transaction_id, &connection) {
        Ok(0) => Error::DeleteMissingTransaction.into_json_response(DELETE_FAILED),
        Ok(_) => {
            tracing::info!("deleted transaction {transaction_id}");
            Json(MessageResponse {
                message: "Transaction deleted.".to_owned(),
            })
            .into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_json_response(DELETE_FAILED)
        }
    }
}

fn parse_id(id: Option<String>) -> Result<TransactionId, Error> {
    let id = match id {
        Some(id) if !id.trim().is_empty() => id,
        _ => return Err(Error::MissingField("id")),
    };

    id.trim().parse().map_err(|_| Error::InvalidId(id))
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::parse_id;

    #[test]
    fn parses_valid_id() {
        assert_eq!(parse_id(Some("42".to_owned())).unwrap(), 42);
    }

    #[test]
    fn missing_id_is_missing_field() {
        assert!(matches!(parse_id(None), Err(Error::MissingField("id"))));
        assert!(matches!(
            parse_id(Some(String::new())),
            Err(Error::MissingField("id"))
        ));
    }

    #[test]
    fn non_numeric_id_is_invalid() {
        assert!(matches!(
            parse_id(Some("abc".to_owned())),
            Err(Error::InvalidId(id)) if id == "abc"
        ));
    }
}
