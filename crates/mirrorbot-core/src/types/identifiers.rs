//! Strongly-typed identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one bot connection: `<platform>:<self id>`.
///
/// This is the bot identity stored on both sides of a forward record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BotKey(String);

impl BotKey {
    /// Build a key from its platform and self id.
    pub fn new(platform: &str, self_id: &str) -> Self {
        Self(format!("{}:{}", platform, self_id))
    }

    /// Wrap an already formatted `platform:self_id` string.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Platform half of the key.
    pub fn platform(&self) -> &str {
        self.0.split_once(':').map(|(p, _)| p).unwrap_or(&self.0)
    }

    /// Self id half of the key.
    pub fn self_id(&self) -> &str {
        self.0.split_once(':').map(|(_, id)| id).unwrap_or("")
    }
}

impl fmt::Display for BotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
