//! Transcript entry operations.
//!
//! Entries are immutable: the only writes are insert-if-absent and the
//! windowed delete. Capture timestamps are stored as Unix seconds so the
//! time index orders and compares them numerically.

use super::connection::CacheDb;
use crate::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

/// One ingested snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Snapshot identity: the filename as published.
    pub id: String,
    pub captured_at: DateTime<Utc>,
    /// Normalized, single-line transcript text.
    pub text: String,
}

impl CacheEntry {
    pub fn new(id: impl Into<String>, captured_at: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self { id: id.into(), captured_at, text: text.into() }
    }
}

/// First whole second at or after `cutoff`; rows are stored at second precision.
fn cutoff_secs(cutoff: DateTime<Utc>) -> i64 {
    cutoff.timestamp() + i64::from(cutoff.timestamp_subsec_nanos() > 0)
}

fn from_unix(secs: i64) -> Result<DateTime<Utc>, Error> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| Error::Storage(format!("timestamp out of range: {secs}")))
}

impl CacheDb {
    /// Whether a snapshot identity has already been ingested.
    pub async fn exists(&self, id: &str) -> Result<bool, Error> {
        let id = id.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let found: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM transcripts WHERE id = ?1)",
                    params![id],
                    |row| row.get(0),
                )?;
                Ok(found)
            })
            .await
            .map_err(Error::from)
    }

    /// Persist an entry unless its identity is already present.
    ///
    /// Returns true if a row was written. Calling this repeatedly with the
    /// same identity leaves the first entry untouched.
    pub async fn insert_if_absent(&self, entry: &CacheEntry) -> Result<bool, Error> {
        let entry = entry.clone();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let changed = conn.execute(
                    "INSERT OR IGNORE INTO transcripts (id, ts_utc, text) VALUES (?1, ?2, ?3)",
                    params![&entry.id, entry.captured_at.timestamp(), &entry.text],
                )?;
                Ok(changed > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every entry captured strictly before `cutoff`.
    ///
    /// Returns the number of deleted entries.
    pub async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        let cutoff = cutoff_secs(cutoff);
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM transcripts WHERE ts_utc < ?1", params![cutoff])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Entries captured at or after `cutoff`, newest first.
    pub async fn select_window(&self, cutoff: DateTime<Utc>) -> Result<Vec<CacheEntry>, Error> {
        let cutoff = cutoff_secs(cutoff);
        self.conn
            .call(move |conn| -> Result<Vec<CacheEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, ts_utc, text FROM transcripts
                     WHERE ts_utc >= ?1
                     ORDER BY ts_utc DESC, id DESC",
                )?;

                let rows = stmt.query_map(params![cutoff], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?, row.get::<_, String>(2)?))
                })?;

                let mut entries = Vec::new();
                for row in rows {
                    let (id, ts, text) = row?;
                    entries.push(CacheEntry { id, captured_at: from_unix(ts)?, text });
                }
                Ok(entries)
            })
            .await
            .map_err(Error::from)
    }

    /// Total number of cached entries.
    pub async fn count(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM transcripts", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
