//! # mirrorbot-core
//!
//! Core types, configuration, and utilities for Mirrorbot.
//!
//! This crate provides shared functionality used across all Mirrorbot crates:
//!
//! - **Configuration**: Loading and load-time validation of endpoints and rules
//! - **Types**: Content elements, inbound events, and platform descriptors
//! - **Utilities**: Path resolution and secret handling

pub mod config;
pub mod error;
pub mod paths;
pub mod secret;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use error::{ConfigError, Error, Result};
pub use secret::SecretString;
pub use types::*;
