//! SQLite-backed record store.

use crate::record::{ForwardRecord, NewForwardRecord, RecordLookup, Side};
use crate::store::RecordStore;
use crate::{LedgerError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mirrorbot_core::types::BotKey;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::{debug, info};

type RecordRow = (i64, String, String, String, String, String, String, i64);

const SELECT_COLUMNS: &str = "SELECT id, origin_message_id, origin_bot, origin_channel_id,
        dest_message_id, dest_bot, dest_channel_id, created_at
 FROM forward_records";

/// SQLite-backed forward ledger.
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Wrap an existing pool. The schema must already exist.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) a ledger database file.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Self::init(&pool).await?;

        info!("Opened forward ledger at {}", path.display());
        Ok(Self::new(pool))
    }

    /// A private in-memory ledger.
    pub async fn in_memory() -> Result<Self> {
        // One connection: every `:memory:` connection is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::init(&pool).await?;
        Ok(Self::new(pool))
    }

    /// Create the ledger table and its lookup indexes.
    pub async fn init(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS forward_records (
                id                INTEGER PRIMARY KEY AUTOINCREMENT,
                origin_message_id TEXT    NOT NULL,
                origin_bot        TEXT    NOT NULL,
                origin_channel_id TEXT    NOT NULL,
                dest_message_id   TEXT    NOT NULL,
                dest_bot          TEXT    NOT NULL,
                dest_channel_id   TEXT    NOT NULL,
                created_at        INTEGER NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_forward_records_origin
             ON forward_records (origin_message_id, origin_bot, origin_channel_id)",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_forward_records_dest
             ON forward_records (dest_message_id, dest_bot, dest_channel_id)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// The underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn decode(row: RecordRow) -> Result<ForwardRecord> {
    let created_at = DateTime::<Utc>::from_timestamp_millis(row.7).ok_or_else(|| {
        LedgerError::Corrupt {
            id: row.0,
            reason: format!("timestamp {} out of range", row.7),
        }
    })?;

    Ok(ForwardRecord {
        id: row.0,
        origin_message_id: row.1,
        origin_bot: BotKey::from_raw(row.2),
        origin_channel_id: row.3,
        dest_message_id: row.4,
        dest_bot: BotKey::from_raw(row.5),
        dest_channel_id: row.6,
        created_at,
    })
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn insert_batch(&self, records: Vec<NewForwardRecord>) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        let written = records.len();

        for record in &records {
            sqlx::query(
                "INSERT INTO forward_records
                 (origin_message_id, origin_bot, origin_channel_id,
                  dest_message_id, dest_bot, dest_channel_id, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&record.origin_message_id)
            .bind(record.origin_bot.as_str())
            .bind(&record.origin_channel_id)
            .bind(&record.dest_message_id)
            .bind(record.dest_bot.as_str())
            .bind(&record.dest_channel_id)
            .bind(record.created_at.timestamp_millis())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("Wrote {} forward records", written);
        Ok(written)
    }

    async fn find(&self, lookup: &RecordLookup) -> Result<Vec<ForwardRecord>> {
        let filter = match lookup.side {
            Side::Origin => {
                "WHERE origin_message_id = ? AND origin_bot = ? AND origin_channel_id = ?"
            }
            Side::Destination => {
                "WHERE dest_message_id = ? AND dest_bot = ? AND dest_channel_id = ?"
            }
        };
        let sql = format!("{} {} ORDER BY id", SELECT_COLUMNS, filter);

        let rows = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(&lookup.message_id)
            .bind(lookup.bot.as_str())
            .bind(&lookup.channel_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(decode).collect()
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ForwardRecord>> {
        let sql = format!("{} ORDER BY id DESC LIMIT ?", SELECT_COLUMNS);
        let rows = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(decode).collect()
    }

    async fn count(&self) -> Result<usize> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM forward_records")
            .fetch_one(&self.pool)
            .await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}
