//! One end-to-end aggregation run for a feed.
//!
//! A run discovers snapshots in the day directories covering the window,
//! ingests the ones the cache has not seen, evicts everything older than the
//! cutoff, then renders the window and its metadata. The cache is the only
//! state carried between runs, which is what makes re-running safe.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use url::Url;

use scanroll_client::{
    KeywordMatcher, SnapshotPayload, Transport, archive_root, day_directories, list_snapshots, normalize_transcript,
};
use scanroll_core::{AppConfig, CacheDb, CacheEntry, Error, FeedConfig, FilenameCodec};

use crate::output::write_atomic;
use crate::render::{RunMetadata, render};

/// A discovered, in-window snapshot not yet known to be cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub captured_at: DateTime<Utc>,
    pub url: Url,
    pub id: String,
}

/// What happened to a single candidate.
#[derive(Debug)]
pub enum CandidateOutcome {
    Inserted,
    AlreadyCached,
    FetchFailed(Error),
    DecodeFailed(Error),
}

/// Counters for one completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub feed: String,
    pub cutoff: DateTime<Utc>,
    pub candidates: usize,
    pub inserted: usize,
    pub already_cached: usize,
    pub failed: usize,
    pub evicted: u64,
    pub lines: usize,
}

/// Collect in-window snapshots from `directories`, newest first.
///
/// Listing entries the codec rejects are dropped silently, as are snapshots
/// captured before `cutoff`.
pub async fn discover(
    transport: &dyn Transport, codec: &FilenameCodec, directories: &[Url], cutoff: DateTime<Utc>,
) -> Vec<Candidate> {
    let extension = codec.pattern().dotted_extension();
    let mut candidates = Vec::new();

    for directory in directories {
        for name in list_snapshots(transport, directory, &extension).await {
            let Some(captured_at) = codec.decode(&name) else {
                continue;
            };
            if captured_at < cutoff {
                continue;
            }
            let Ok(url) = directory.join(&name) else {
                continue;
            };
            candidates.push(Candidate { captured_at, url, id: name });
        }
    }

    candidates.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));
    candidates
}

/// Ingest one candidate unless the cache already has it.
///
/// Network and payload problems come back as outcomes so the caller can move
/// on to the next candidate; only cache failures are errors.
pub async fn ingest(
    cache: &CacheDb, transport: &dyn Transport, candidate: &Candidate,
) -> Result<CandidateOutcome, Error> {
    if cache.exists(&candidate.id).await? {
        return Ok(CandidateOutcome::AlreadyCached);
    }

    let body = match transport.get_text(&candidate.url).await {
        Ok(body) => body,
        Err(e) => return Ok(CandidateOutcome::FetchFailed(e)),
    };

    let payload = match SnapshotPayload::parse(&body) {
        Ok(payload) => payload,
        Err(e) => return Ok(CandidateOutcome::DecodeFailed(e)),
    };

    let text = normalize_transcript(payload.raw_transcript().unwrap_or_default());
    let entry = CacheEntry::new(candidate.id.clone(), candidate.captured_at, text);

    if cache.insert_if_absent(&entry).await? {
        Ok(CandidateOutcome::Inserted)
    } else {
        Ok(CandidateOutcome::AlreadyCached)
    }
}

/// Run the whole pipeline for one feed as of `now`.
///
/// # Errors
///
/// Fails if the feed is misconfigured, the cache cannot be used, or an output
/// cannot be written. Unreachable directories and bad snapshots are not errors.
pub async fn run_feed(
    app: &AppConfig, feed: &FeedConfig, transport: &dyn Transport, now: DateTime<Utc>,
) -> Result<RunSummary> {
    let paths = app.paths_for(feed);
    let codec = FilenameCodec::new(feed.filename.clone())?;
    let tz = feed.display_tz()?;
    let matcher = KeywordMatcher::new(&feed.keyword_tiers);

    let cutoff = now - Duration::hours(i64::from(feed.window_hours));
    let root = archive_root(&feed.archive_base)?;
    let directories = day_directories(&root, now, feed.window_hours)?;

    tracing::info!(feed = %feed.name, %cutoff, directories = directories.len(), "starting run");

    let cache = CacheDb::open(&paths.db)
        .await
        .with_context(|| format!("failed to open cache {}", paths.db.display()))?;

    let candidates = discover(transport, &codec, &directories, cutoff).await;
    let mut summary =
        RunSummary { feed: feed.name.clone(), cutoff, candidates: candidates.len(), ..Default::default() };

    for candidate in &candidates {
        match ingest(&cache, transport, candidate).await? {
            CandidateOutcome::Inserted => summary.inserted += 1,
            CandidateOutcome::AlreadyCached => summary.already_cached += 1,
            CandidateOutcome::FetchFailed(e) => {
                summary.failed += 1;
                tracing::warn!(feed = %feed.name, snapshot = %candidate.id, error = %e, "snapshot fetch failed");
            }
            CandidateOutcome::DecodeFailed(e) => {
                summary.failed += 1;
                tracing::warn!(feed = %feed.name, snapshot = %candidate.id, error = %e, "snapshot payload unreadable");
            }
        }
    }

    summary.evicted = cache.delete_before(cutoff).await?;
    let entries = cache.select_window(cutoff).await?;
    summary.lines = entries.len();

    write_atomic(&paths.output, render(&entries, &tz, &feed.display).as_bytes())?;

    let meta = RunMetadata::new(now, feed.window_hours, &entries, summary.inserted, &matcher);
    write_atomic(&paths.meta, serde_json::to_string(&meta)?.as_bytes())?;

    tracing::info!(
        feed = %feed.name,
        candidates = summary.candidates,
        inserted = summary.inserted,
        failed = summary.failed,
        evicted = summary.evicted,
        lines = summary.lines,
        "run complete"
    );

    Ok(summary)
}
