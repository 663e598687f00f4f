//! Validated endpoints and resolved forward rules.
//!
//! [`Config::validate`](super::Config::validate) turns every endpoint
//! definition into two independent optional capability records. Code past
//! this point never re-checks wildcards, regexes, or required ids.

use crate::secret::SecretString;
use crate::types::BotKey;
use regex::Regex;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Auxiliary file-retrieval endpoint with a parsed base URL.
#[derive(Debug, Clone)]
pub struct FileApi {
    /// Base URL.
    pub endpoint: Url,

    /// Bearer token.
    pub token: SecretString,
}

/// Source capability of an endpoint.
#[derive(Debug, Clone)]
pub struct SourceEndpoint {
    /// Endpoint name in the config file.
    pub name: String,

    /// Platform name.
    pub platform: String,

    /// Receiving bot id; `None` means any bot.
    pub self_id: Option<String>,

    /// Channel id; `None` means any channel.
    pub channel_id: Option<String>,

    /// Compiled blocking-word patterns, in configured order.
    pub blocking_words: Vec<Regex>,

    /// Auxiliary file endpoint, when configured.
    pub file_api: Option<FileApi>,
}

impl SourceEndpoint {
    /// First text that matches a blocking-word pattern.
    pub fn blocked_by(&self, texts: &[&str]) -> Option<&Regex> {
        self.blocking_words
            .iter()
            .find(|re| texts.iter().any(|t| re.is_match(t)))
    }
}

/// Target capability of an endpoint.
#[derive(Debug, Clone)]
pub struct TargetEndpoint {
    /// Endpoint name in the config file.
    pub name: String,

    /// Platform name.
    pub platform: String,

    /// Sending bot id.
    pub self_id: String,

    /// Channel id.
    pub channel_id: String,

    /// Whether the target is disabled.
    pub disabled: bool,

    /// Whether to impersonate the original author.
    pub impersonate: bool,
}

impl TargetEndpoint {
    /// Identity of the sending bot.
    pub fn bot_key(&self) -> BotKey {
        BotKey::new(&self.platform, &self.self_id)
    }
}

/// A validated endpoint.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Endpoint name.
    pub name: String,

    /// Present when the endpoint may be read from.
    pub source: Option<SourceEndpoint>,

    /// Present when the endpoint may be delivered to.
    pub target: Option<TargetEndpoint>,
}

/// A rule with its source and enabled targets resolved.
#[derive(Debug, Clone)]
pub struct ResolvedRule {
    /// Position of the rule in the config file.
    pub index: usize,

    /// Source endpoint.
    pub source: SourceEndpoint,

    /// Enabled targets, in configured order.
    pub targets: Vec<TargetEndpoint>,
}

/// Why a rule performs no subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InertReason {
    /// The source name is not a defined source-capable endpoint.
    UnknownSource(String),

    /// No target name resolved to an enabled target-capable endpoint.
    NoTargets,
}

impl std::fmt::Display for InertReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownSource(name) => write!(f, "source '{}' is not defined", name),
            Self::NoTargets => f.write_str("no enabled targets"),
        }
    }
}

/// Outcome of resolving one rule.
#[derive(Debug, Clone)]
pub enum RuleResolution {
    /// The rule subscribes to its source.
    Active(ResolvedRule),

    /// The rule never subscribes.
    Inert {
        /// Position of the rule in the config file.
        index: usize,
        /// Why the rule is inert.
        reason: InertReason,
    },
}

/// Validated configuration: endpoints, rules, and pacing delays.
#[derive(Debug, Clone, Default)]
pub struct ForwardPlan {
    /// Validated endpoints by name.
    pub endpoints: BTreeMap<String, Endpoint>,

    /// Rules as written: source name and target names.
    pub rules: Vec<super::RuleConfig>,

    /// Pacing delay per platform in milliseconds.
    pub delay: std::collections::HashMap<String, u64>,
}

impl ForwardPlan {
    /// Pacing delay for sends to a platform.
    pub fn delay_for(&self, platform: &str) -> Duration {
        Duration::from_millis(
            self.delay
                .get(platform)
                .copied()
                .unwrap_or(super::DEFAULT_DELAY_MS),
        )
    }

    /// Resolve every rule. Unknown names make a rule inert, never an error.
    pub fn resolve(&self) -> Vec<RuleResolution> {
        self.rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                let Some(source) = self
                    .endpoints
                    .get(&rule.source)
                    .and_then(|e| e.source.clone())
                else {
                    warn!("Rule {} is inert: source '{}' is not defined", index, rule.source);
                    return RuleResolution::Inert {
                        index,
                        reason: InertReason::UnknownSource(rule.source.clone()),
                    };
                };

                let targets: Vec<TargetEndpoint> = rule
                    .targets
                    .iter()
                    .filter_map(|name| {
                        let target = self.endpoints.get(name).and_then(|e| e.target.clone());
                        if target.is_none() {
                            warn!("Rule {}: target '{}' is not defined", index, name);
                        }
                        target
                    })
                    .filter(|t| !t.disabled)
                    .collect();

                if targets.is_empty() {
                    warn!("Rule {} is inert: no enabled targets", index);
                    return RuleResolution::Inert {
                        index,
                        reason: InertReason::NoTargets,
                    };
                }

                RuleResolution::Active(ResolvedRule {
                    index,
                    source,
                    targets,
                })
            })
            .collect()
    }

    /// Active rules only.
    pub fn active_rules(&self) -> Vec<ResolvedRule> {
        self.resolve()
            .into_iter()
            .filter_map(|r| match r {
                RuleResolution::Active(rule) => Some(rule),
                RuleResolution::Inert { .. } => None,
            })
            .collect()
    }
}
