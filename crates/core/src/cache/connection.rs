//! Opening the per-feed cache file.

use super::migrations;
use crate::Error;
use std::path::Path;
use std::time::Duration;
use tokio_rusqlite::Connection;

/// Scheduler invocations may overlap; a writer waits this long for the lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to one feed's transcript cache.
///
/// Statements run on tokio-rusqlite's background thread, so every method is
/// async even though the pipeline drives them one at a time.
#[derive(Clone, Debug)]
pub struct CacheDb {
    pub(crate) conn: Connection,
}

impl CacheDb {
    /// Open (or create) the cache at `path` and bring its schema up to date.
    ///
    /// Missing parent directories are created first.
    ///
    /// # Errors
    ///
    /// `Error::Storage` if the directory cannot be created, otherwise the
    /// database or migration error that stopped the open.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        ensure_parent_dir(path)?;

        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::configure(conn, true).await
    }

    /// Open a throwaway in-memory cache.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory().await.map_err(|e| Error::Database(e.into()))?;
        Self::configure(conn, false).await
    }

    async fn configure(conn: Connection, on_disk: bool) -> Result<Self, Error> {
        conn.call(move |conn| -> Result<(), Error> {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            if on_disk {
                conn.execute_batch("PRAGMA journal_mode=WAL;")?;
            }
            conn.execute_batch("PRAGMA synchronous=NORMAL; PRAGMA temp_store=MEMORY;")?;
            Ok(())
        })
        .await
        .map_err(Error::from)?;

        let db = Self { conn };
        db.ensure_schema().await?;
        Ok(db)
    }

    /// Apply pending migrations. Safe to call on every run.
    pub async fn ensure_schema(&self) -> Result<(), Error> {
        migrations::run(&self.conn).await
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), Error> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| Error::Storage(format!("cannot create {}: {e}", parent.display()))),
        _ => Ok(()),
    }
}
