//! Record store trait and the in-memory implementation.

use crate::record::{ForwardRecord, NewForwardRecord, RecordLookup};
use crate::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Append-only store of forward records.
///
/// Writes are inserts only; rows are never updated or deleted here.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Append a batch of records. Returns the number of rows written.
    async fn insert_batch(&self, records: Vec<NewForwardRecord>) -> Result<usize>;

    /// All rows matching a lookup, oldest first.
    async fn find(&self, lookup: &RecordLookup) -> Result<Vec<ForwardRecord>>;

    /// Most recent rows, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<ForwardRecord>>;

    /// Count rows.
    async fn count(&self) -> Result<usize>;
}

/// In-memory record store.
#[derive(Default)]
pub struct MemoryRecordStore {
    rows: RwLock<Vec<ForwardRecord>>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert_batch(&self, records: Vec<NewForwardRecord>) -> Result<usize> {
        let mut rows = self.rows.write().await;
        let written = records.len();
        for record in records {
            let id = rows.last().map_or(1, |r| r.id + 1);
            rows.push(record.with_id(id));
        }
        Ok(written)
    }

    async fn find(&self, lookup: &RecordLookup) -> Result<Vec<ForwardRecord>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|r| r.matches(lookup)).cloned().collect())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ForwardRecord>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().rev().take(limit).cloned().collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.rows.read().await.len())
    }
}
