//! Application router configuration.

use axum::{
    Router,
    http::StatusCode,
    response::Response,
    routing::{MethodRouter, get},
};

use crate::{
    AppState, endpoints, json_error,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, export_transactions_endpoint,
        get_summary_endpoint, list_transactions_endpoint, restore_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// The transaction verbs are served at both [endpoints::TRANSACTIONS_API] and
/// [endpoints::TRANSACTIONS].
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::TRANSACTIONS_API, transaction_routes())
        .route(endpoints::TRANSACTIONS, transaction_routes())
        .route(endpoints::EXPORT, get(export_transactions_endpoint))
        .route(endpoints::SUMMARY, get(get_summary_endpoint))
        .fallback(get_404_not_found)
        .with_state(state)
}

fn transaction_routes() -> MethodRouter<AppState> {
    get(list_transactions_endpoint)
        .post(create_transaction_endpoint)
        .delete(delete_transaction_endpoint)
        .put(restore_transactions_endpoint)
}

async fn get_404_not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, "Not found.")
}
