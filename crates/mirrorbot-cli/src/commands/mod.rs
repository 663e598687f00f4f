//! CLI command implementations.

pub mod config;
pub mod records;
pub mod rules;
