//! Client code for scanroll.
//!
//! This crate provides the HTTP fetch client, archive discovery and the text
//! helpers the pipeline applies to fetched snapshots.

pub mod archive;
pub mod extract;
pub mod fetch;

pub use archive::{SnapshotPayload, archive_root, day_directories, day_directory, list_snapshots};
pub use extract::{KeywordMatcher, NO_AUDIO, NO_TRANSCRIPT, extract_hrefs, normalize_transcript};
pub use fetch::{FetchClient, FetchConfig, FetchResponse, Transport};
