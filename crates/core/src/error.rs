//! Unified error types for scanroll.
//!
//! The code prefix in each message matches the failure classes the pipeline
//! logs: cache failures abort a feed's run, everything else is per-snapshot.

use tokio_rusqlite::rusqlite;

/// Unified error types for the scanroll crates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Cache file could not be prepared on disk.
    #[error("CACHE_ERROR: {0}")]
    Storage(String),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Request did not complete within the configured timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Non-success status or transport failure. Also used when the client cannot be built.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Snapshot payload was not the expected JSON document.
    #[error("PAYLOAD_DECODE: {0}")]
    PayloadDecode(String),

    /// Filename pattern could not be compiled.
    #[error("INVALID_PATTERN: {0}")]
    InvalidPattern(String),
}

impl Error {
    /// Whether the error came from the cache store rather than the network.
    pub fn is_cache_error(&self) -> bool {
        matches!(self, Error::Database(_) | Error::Storage(_) | Error::MigrationFailed(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
