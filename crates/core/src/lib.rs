//! Core types and shared functionality for scanroll.
//!
//! This crate provides:
//! - Dedup and window cache with SQLite backend
//! - Snapshot filename codec
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod filename;

pub use cache::{CacheDb, CacheEntry};
pub use config::{AppConfig, ConfigError, DisplayConfig, FeedConfig, FeedPaths, KeywordTier};
pub use error::Error;
pub use filename::{FilenameCodec, FilenamePattern};
