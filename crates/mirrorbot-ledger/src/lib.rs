//! Forward record ledger for Mirrorbot.
//!
//! This crate provides:
//! - The [`ForwardRecord`] row pairing a delivered message's origin and
//!   destination identities
//! - The append-only [`RecordStore`] trait with in-memory and SQLite backends
//! - Keyed lookups in either direction for quote resolution

pub mod error;
pub mod record;
pub mod sqlite;
pub mod store;

pub use error::LedgerError;
pub use record::{ForwardRecord, NewForwardRecord, RecordLookup, Side};
pub use sqlite::SqliteRecordStore;
pub use store::{MemoryRecordStore, RecordStore};

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
