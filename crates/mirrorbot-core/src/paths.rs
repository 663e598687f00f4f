//! Path resolution utilities.

use crate::error::ConfigError;
use std::path::PathBuf;

/// Get the Mirrorbot base directory (~/.mirrorbot).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".mirrorbot"))
}

/// Get the main config file path (~/.mirrorbot/mirrorbot.json5).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("mirrorbot.json5"))
}

/// Get the default forward ledger path (~/.mirrorbot/ledger.db).
pub fn ledger_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("ledger.db"))
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
