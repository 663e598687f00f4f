//! Ledger error types.

use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored row could not be decoded.
    #[error("Corrupt record {id}: {reason}")]
    Corrupt {
        /// Row id.
        id: i64,
        /// What was wrong with it.
        reason: String,
    },
}
