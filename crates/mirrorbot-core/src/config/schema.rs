//! Configuration schema definitions.

use crate::secret::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;

/// Pacing delay between consecutive targets when a platform has no entry.
pub const DEFAULT_DELAY_MS: u64 = 200;

/// Main Mirrorbot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Named endpoint definitions.
    #[serde(default)]
    pub endpoints: BTreeMap<String, EndpointConfig>,

    /// Forward rules, each one source name to an ordered target list.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,

    /// Per-platform pacing delay in milliseconds.
    #[serde(default)]
    pub delay: HashMap<String, u64>,

    /// Forward ledger settings.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Pacing delay for sends to a platform.
    pub fn delay_for(&self, platform: &str) -> Duration {
        Duration::from_millis(self.delay.get(platform).copied().unwrap_or(DEFAULT_DELAY_MS))
    }
}

/// An endpoint definition, tagged by what it may be used as.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EndpointConfig {
    /// Read-only endpoint.
    Source(SourceEndpointConfig),

    /// Write-only endpoint.
    Target(TargetEndpointConfig),

    /// Endpoint usable as both source and target.
    Full(FullEndpointConfig),
}

impl EndpointConfig {
    /// Platform name of the endpoint.
    pub fn platform(&self) -> &str {
        match self {
            Self::Source(s) => &s.platform,
            Self::Target(t) => &t.platform,
            Self::Full(f) => &f.platform,
        }
    }

    /// Type tag as written in the config file.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Source(_) => "source",
            Self::Target(_) => "target",
            Self::Full(_) => "full",
        }
    }
}

/// Source endpoint fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEndpointConfig {
    /// Platform name.
    pub platform: String,

    /// Channel id, or `*` for every channel.
    pub channel_id: String,

    /// Receiving bot id, or `*` for every bot.
    #[serde(default = "wildcard")]
    pub self_id: String,

    /// Human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Regular expressions; a match on any text element drops the message.
    #[serde(default)]
    pub blocking_words: Vec<String>,

    /// Auxiliary file-retrieval endpoint for platforms without direct media URLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_api: Option<FileApiConfig>,
}

/// Target endpoint fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetEndpointConfig {
    /// Platform name.
    pub platform: String,

    /// Channel id messages are delivered to.
    pub channel_id: String,

    /// Sending bot id. Required, no wildcard.
    pub self_id: String,

    /// Skip this target in every rule.
    #[serde(default)]
    pub disabled: bool,

    /// Show the original author through the platform's impersonation feature.
    #[serde(default)]
    pub impersonate: bool,
}

/// Fields of an endpoint usable in both directions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullEndpointConfig {
    /// Platform name.
    pub platform: String,

    /// Channel id.
    pub channel_id: String,

    /// Bot id. Required, no wildcard.
    pub self_id: String,

    /// Human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Regular expressions; a match on any text element drops the message.
    #[serde(default)]
    pub blocking_words: Vec<String>,

    /// Skip this endpoint as a target.
    #[serde(default)]
    pub disabled: bool,

    /// Show the original author through the platform's impersonation feature.
    #[serde(default)]
    pub impersonate: bool,

    /// Auxiliary file-retrieval endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_api: Option<FileApiConfig>,
}

/// Auxiliary file-retrieval side-channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileApiConfig {
    /// Base URL; operations are posted to `<endpoint>/<operation>`.
    #[serde(default)]
    pub endpoint: String,

    /// Bearer token.
    #[serde(default)]
    pub token: SecretString,
}

/// One forward rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Source endpoint name.
    pub source: String,

    /// Target endpoint names, in pacing order.
    #[serde(default)]
    pub targets: Vec<String>,
}

/// Forward ledger configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// SQLite database file. Defaults to `~/.mirrorbot/ledger.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

fn wildcard() -> String {
    "*".to_string()
}
