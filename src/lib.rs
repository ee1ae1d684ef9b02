//! Rupiah Ledger is a small personal finance tracker.
//!
//! This library provides a JSON REST API over a single SQLite table of income
//! and expense transactions, plus backup export/restore and a derived
//! income/expense/balance summary.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod database_id;
mod db;
mod endpoints;
mod logging;
mod routing;
mod transaction;

pub use app_state::AppState;
pub use database_id::TransactionId;
pub use db::{initialize as initialize_db, open_database};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{
    Kind, NewTransaction, Summary, Transaction, count_transactions, create_transaction,
    get_all_transactions,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl+c: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
        },
    }

    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required field was absent, null, empty or zero.
    #[error("the field \"{0}\" is required")]
    MissingField(&'static str),

    /// The transaction kind was not one of `income` or `expense`.
    #[error("\"{0}\" is not a valid transaction kind, expected \"income\" or \"expense\"")]
    InvalidKind(String),

    /// The amount could not be read as a whole number.
    #[error("\"{0}\" is not a valid amount, expected a whole number")]
    InvalidAmount(String),

    /// The date could not be read as a `YYYY-MM-DD` calendar date.
    #[error("\"{0}\" is not a valid date, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The transaction ID in the query string was not an integer.
    #[error("\"{0}\" is not a valid transaction ID")]
    InvalidId(String),

    /// The request body was not valid JSON for the endpoint.
    #[error("invalid JSON body: {0}")]
    InvalidJson(String),

    /// The query string could not be read.
    #[error("invalid query string: {0}")]
    InvalidQuery(String),

    /// The restore body did not contain a `transactions` array.
    #[error("invalid import format, expected {{\"transactions\": [...]}}")]
    InvalidRestorePayload,

    /// One of the records in a restore body could not be read.
    ///
    /// Nothing is deleted when this error is returned.
    #[error("invalid transaction at index {index}: {reason}")]
    InvalidRestoreRecord {
        /// The position of the record in the `transactions` array.
        index: usize,
        /// Why the record was rejected.
        reason: String,
    },

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JsonSerializationError(String),

    /// The CSV export could not be written.
    #[error("could not write CSV: {0}")]
    CsvError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody<'a> {
    pub error: &'a str,
}

impl Error {
    /// The status code the client should receive for this error.
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingField(_)
            | Error::InvalidKind(_)
            | Error::InvalidAmount(_)
            | Error::InvalidDate(_)
            | Error::InvalidId(_)
            | Error::InvalidJson(_)
            | Error::InvalidQuery(_)
            | Error::InvalidRestorePayload
            | Error::InvalidRestoreRecord { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound | Error::DeleteMissingTransaction => StatusCode::NOT_FOUND,
            Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::JsonSerializationError(_)
            | Error::CsvError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert the error into a JSON response of the form `{"error": "..."}`.
    ///
    /// Client errors (400 and 404) explain what was wrong with the request.
    /// Server errors are logged and the client only sees `failure_message`.
    pub(crate) fn into_json_response(self, failure_message: &str) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!("{failure_message} {self}");
            return json_error(status_code, failure_message);
        }

        let message = match self {
            Error::DeleteMissingTransaction => "Transaction not found.".to_owned(),
            error => error.to_string(),
        };

        json_error(status_code, &message)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.into_json_response("An unexpected error occurred.")
    }
}

/// Build a response with `status_code` and the body `{"error": message}`.
pub(crate) fn json_error(status_code: StatusCode, message: &str) -> Response {
    (status_code, Json(ErrorBody { error: message })).into_response()
}
