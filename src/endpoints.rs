//! The API's route paths.

/// The route the dashboard client uses to access transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The bare resource path for transactions, serves the same verbs as [TRANSACTIONS_API].
pub const TRANSACTIONS: &str = "/transactions";
/// The route for downloading a backup of all transactions.
pub const EXPORT: &str = "/api/transactions/export";
/// The route for the income, expense and balance totals.
pub const SUMMARY: &str = "/api/summary";
