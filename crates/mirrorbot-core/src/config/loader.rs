//! Configuration loading, persistence, and validation.

use super::{
    Config, Endpoint, EndpointConfig, FileApi, FileApiConfig, ForwardPlan, SourceEndpoint,
    TargetEndpoint,
};
use crate::error::ConfigError;
use crate::paths;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Ledger database path, falling back to `~/.mirrorbot/ledger.db`.
    pub fn ledger_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.ledger.path {
            Some(path) => Ok(paths::expand_tilde(&path.to_string_lossy())),
            None => paths::ledger_file(),
        }
    }

    /// Validate the configuration into a [`ForwardPlan`], collecting all
    /// errors before returning.
    pub fn validate(&self) -> Result<ForwardPlan, ConfigError> {
        let mut errors = Vec::new();
        let mut plan = ForwardPlan {
            rules: self.rules.clone(),
            delay: self.delay.clone(),
            ..Default::default()
        };

        for (name, endpoint) in &self.endpoints {
            let before = errors.len();
            let validated = validate_endpoint(name, endpoint, &mut errors);
            if errors.len() == before {
                plan.endpoints.insert(name.clone(), validated);
            }
        }

        for (i, rule) in self.rules.iter().enumerate() {
            if rule.source.trim().is_empty() {
                errors.push(format!("Rule [{}]: source must not be empty", i));
            }
        }

        if errors.is_empty() {
            Ok(plan)
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }
}

fn validate_endpoint(name: &str, endpoint: &EndpointConfig, errors: &mut Vec<String>) -> Endpoint {
    let platform = endpoint.platform();
    if platform.trim().is_empty() {
        errors.push(format!("Endpoint '{}': platform must not be empty", name));
    }

    let (source, target) = match endpoint {
        EndpointConfig::Source(s) => {
            let source = source_capability(
                name,
                platform,
                &s.self_id,
                &s.channel_id,
                &s.blocking_words,
                s.file_api.as_ref(),
                errors,
            );
            (Some(source), None)
        }
        EndpointConfig::Target(t) => {
            let target = target_capability(
                name,
                platform,
                &t.self_id,
                &t.channel_id,
                t.disabled,
                t.impersonate,
                errors,
            );
            (None, Some(target))
        }
        EndpointConfig::Full(f) => {
            let source = source_capability(
                name,
                platform,
                &f.self_id,
                &f.channel_id,
                &f.blocking_words,
                f.file_api.as_ref(),
                errors,
            );
            let target = target_capability(
                name,
                platform,
                &f.self_id,
                &f.channel_id,
                f.disabled,
                f.impersonate,
                errors,
            );
            (Some(source), Some(target))
        }
    };

    Endpoint {
        name: name.to_string(),
        source,
        target,
    }
}

fn concrete(selector: &str) -> Option<String> {
    match selector.trim() {
        "" | "*" => None,
        id => Some(id.to_string()),
    }
}

fn source_capability(
    name: &str,
    platform: &str,
    self_id: &str,
    channel_id: &str,
    blocking_words: &[String],
    file_api: Option<&FileApiConfig>,
    errors: &mut Vec<String>,
) -> SourceEndpoint {
    if channel_id.trim().is_empty() {
        errors.push(format!("Endpoint '{}': channel_id must not be empty", name));
    }

    let blocking_words = blocking_words
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                errors.push(format!(
                    "Endpoint '{}': invalid blocking word '{}': {}",
                    name, pattern, e
                ));
                None
            }
        })
        .collect();

    // A blank endpoint or token means "not configured", not an error.
    let file_api = file_api
        .filter(|api| !api.endpoint.trim().is_empty() && !api.token.is_blank())
        .and_then(|api| match Url::parse(api.endpoint.trim()) {
            Ok(endpoint) => Some(FileApi {
                endpoint,
                token: api.token.clone(),
            }),
            Err(e) => {
                errors.push(format!(
                    "Endpoint '{}': invalid file_api endpoint '{}': {}",
                    name, api.endpoint, e
                ));
                None
            }
        });

    SourceEndpoint {
        name: name.to_string(),
        platform: platform.to_string(),
        self_id: concrete(self_id),
        channel_id: concrete(channel_id),
        blocking_words,
        file_api,
    }
}

fn target_capability(
    name: &str,
    platform: &str,
    self_id: &str,
    channel_id: &str,
    disabled: bool,
    impersonate: bool,
    errors: &mut Vec<String>,
) -> TargetEndpoint {
    if concrete(self_id).is_none() {
        errors.push(format!(
            "Endpoint '{}': target self_id must be a concrete bot id",
            name
        ));
    }
    if concrete(channel_id).is_none() {
        errors.push(format!(
            "Endpoint '{}': target channel_id must be a concrete channel id",
            name
        ));
    }

    TargetEndpoint {
        name: name.to_string(),
        platform: platform.to_string(),
        self_id: self_id.trim().to_string(),
        channel_id: channel_id.trim().to_string(),
        disabled,
        impersonate,
    }
}
