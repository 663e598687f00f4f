//! Channel error types.

use thiserror::Error;

/// Errors reported by platform connections.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bot connection not found.
    #[error("Bot not found: {0}")]
    NotFound(String),

    /// Bot connection not online.
    #[error("Bot not connected: {0}")]
    NotConnected(String),

    /// Bot connection already registered.
    #[error("Bot already registered: {0}")]
    AlreadyExists(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: retry after {retry_after_secs} seconds")]
    RateLimit {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// The platform rejected the payload.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Guild member or role lookup failed.
    #[error("Lookup failed: {0}")]
    Lookup(String),

    /// Platform-specific error.
    #[error("Channel error ({platform}): {message}")]
    Platform {
        /// Platform name.
        platform: String,
        /// Error message.
        message: String,
    },

    /// Timeout error.
    #[error("Operation timed out")]
    Timeout,
}

impl ChannelError {
    /// Create a platform-specific error.
    pub fn platform(platform: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Platform {
            platform: platform.into(),
            message: message.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a lookup error.
    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup(message.into())
    }

    /// Whether the failure is transient.
    ///
    /// Classifies failed sends for logging and reporting; nothing retries.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimit { .. } | Self::Timeout | Self::NotConnected(_))
    }
}
