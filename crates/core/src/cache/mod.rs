//! SQLite-backed dedup and window cache for ingested snapshots.
//!
//! This module provides the durable record of which snapshots a feed has
//! already ingested, using SQLite with async access via tokio-rusqlite:
//!
//! - One row per snapshot identity, immutable once written
//! - Insert-if-absent for idempotent ingestion
//! - A time index for window reads and eviction
//! - Automatic schema migrations

pub mod connection;
pub mod migrations;
pub mod transcripts;

pub use crate::Error;

pub use connection::CacheDb;
pub use transcripts::CacheEntry;
