//! Forwarding error types.

use mirrorbot_channels::ChannelError;
use mirrorbot_ledger::LedgerError;
use thiserror::Error;

/// Errors that can occur while forwarding a message.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Platform connection error (send or lookup).
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Forward ledger error.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Auxiliary file endpoint reported a failure.
    #[error("File API error: {0}")]
    FileApi(String),

    /// A content element could not be rewritten.
    #[error("Cannot transform {kind} element: {message}")]
    Transform {
        /// Element kind.
        kind: &'static str,
        /// What went wrong.
        message: String,
    },
}

impl ForwardError {
    /// Create a transformation error.
    pub fn transform(kind: &'static str, message: impl Into<String>) -> Self {
        Self::Transform {
            kind,
            message: message.into(),
        }
    }
}
