//! Defines the endpoint for downloading a backup of all transactions.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State, rejection::QueryRejection},
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    transaction::{Transaction, get_all_transactions},
};

/// The state needed to export transactions.
#[derive(Debug, Clone)]
pub struct ExportState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The file formats a backup can be downloaded in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// `{"transactions": [...]}`, the same shape the restore endpoint accepts.
    #[default]
    Json,
    /// One row per transaction with a header row.
    Csv,
}

impl ExportFormat {
    fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }
}

/// The query string for an export, e.g. `?format=csv`.
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    format: ExportFormat,
}

/// A backup file in JSON format.
#[derive(Debug, Serialize, Deserialize)]
pub struct Backup {
    /// Every transaction, most recent date first.
    pub transactions: Vec<Transaction>,
}

const EXPORT_FAILED: &str = "Could not export transactions.";

/// A route handler that responds with every transaction as a file download.
pub async fn export_transactions_endpoint(
    State(state): State<ExportState>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            return Error::InvalidQuery(rejection.body_text()).into_json_response(EXPORT_FAILED);
        }
    };

    let transactions = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_json_response(EXPORT_FAILED);
            }
        };

        match get_all_transactions(&connection) {
            Ok(transactions) => transactions,
            Err(error) => return error.into_json_response(EXPORT_FAILED),
        }
    };

    let count = transactions.len();
    let body = match query.format {
        ExportFormat::Json => serde_json::to_vec_pretty(&Backup { transactions })
            .map_err(|error| Error::JsonSerializationError(error.to_string())),
        ExportFormat::Csv => write_csv(&transactions),
    };

    let body = match body {
        Ok(body) => body,
        Err(error) => return error.into_json_response(EXPORT_FAILED),
    };

    tracing::info!("exported {count} transactions as {:?}", query.format);

    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, query.format.content_type().to_owned()),
            (
                CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}\"",
                    backup_file_name(OffsetDateTime::now_utc().date(), query.format)
                ),
            ),
        ],
        body,
    )
        .into_response()
}

fn backup_file_name(date: Date, format: ExportFormat) -> String {
    format!("transactions-backup-{date}.{}", format.extension())
}

fn write_csv(transactions: &[Transaction]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for transaction in transactions {
        writer
            .serialize(transaction)
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::transaction::{Kind, Transaction};

    use super::{ExportFormat, backup_file_name, write_csv};

    #[test]
    fn file_name_has_date_and_extension() {
        assert_eq!(
            backup_file_name(date!(2024 - 06 - 30), ExportFormat::Json),
            "transactions-backup-2024-06-30.json"
        );
        assert_eq!(
            backup_file_name(date!(2024 - 06 - 30), ExportFormat::Csv),
            "transactions-backup-2024-06-30.csv"
        );
    }

    #[test]
    fn csv_has_header_and_rows() {
        let transactions = [
            Transaction {
                id: 2,
                kind: Kind::Expense,
                description: "Rent, June".to_owned(),
                amount: 400,
                date: date!(2024 - 06 - 01),
            },
            Transaction {
                id: 1,
                kind: Kind::Income,
                description: "Salary".to_owned(),
                amount: 1000,
                date: date!(2024 - 05 - 31),
            },
        ];

        let csv = String::from_utf8(write_csv(&transactions).unwrap()).unwrap();

        assert_eq!(
            csv,
            "id,kind,description,amount,date\n\
             2,expense,\"Rent, June\",400,2024-06-01\n\
             1,income,Salary,1000,2024-05-31\n"
        );
    }

    #[test]
    fn csv_for_no_transactions_is_empty() {
        let csv = write_csv(&[]).unwrap();

        assert!(csv.is_empty());
    }
}
