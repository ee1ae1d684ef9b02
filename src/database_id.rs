//! Database ID type definition.

/// Alias for the integer type used for transaction IDs.
///
/// IDs are assigned by SQLite and are never reused after a deletion.
pub type TransactionId = i64;
