//! Archive layout: day directories, snapshot discovery, payload decoding.
//!
//! The archive publishes one directory per UTC calendar day at
//! `<base><year>/<month>/<day>/` (month and day unpadded), served as an HTML
//! index whose anchors name the files in it. Each snapshot is a JSON document
//! carrying the transcript at `transcript.transcript`.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Deserialize;
use url::Url;

use scanroll_core::Error;

use crate::extract::extract_hrefs;
use crate::fetch::Transport;

/// Parse an archive base URL, making sure it addresses a directory.
pub fn archive_root(base: &str) -> Result<Url, Error> {
    let mut url = Url::parse(base).map_err(|e| Error::InvalidUrl(format!("{base}: {e}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Directory holding the snapshots captured on `day`'s UTC date.
pub fn day_directory(root: &Url, day: DateTime<Utc>) -> Result<Url, Error> {
    root.join(&format!("{}/{}/{}/", day.year(), day.month(), day.day()))
        .map_err(|e| Error::InvalidUrl(e.to_string()))
}

/// Day directories that together cover `window_hours` back from `now`.
///
/// Always includes today and yesterday; longer windows add one directory per
/// further day. Ordered newest first.
pub fn day_directories(root: &Url, now: DateTime<Utc>, window_hours: u32) -> Result<Vec<Url>, Error> {
    let lookback_days = i64::from(window_hours.div_ceil(24).max(1));
    (0..=lookback_days)
        .map(|days| day_directory(root, now - Duration::days(days)))
        .collect()
}

/// List the snapshot file names in one archive directory.
///
/// Keeps hrefs ending in `extension` (dotted, e.g. `.json`). A directory that
/// cannot be fetched is reported and treated as empty; it is retried on the
/// next run anyway.
pub async fn list_snapshots(transport: &dyn Transport, directory: &Url, extension: &str) -> BTreeSet<String> {
    let html = match transport.get_text(directory).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!(directory = %directory, error = %e, "directory listing unavailable");
            return BTreeSet::new();
        }
    };

    extract_hrefs(&html)
        .into_iter()
        .filter(|href| href.ends_with(extension))
        .collect()
}

/// Snapshot payload as published by the archive.
///
/// Only the transcript is read; other fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotPayload {
    #[serde(default)]
    pub transcript: Option<TranscriptBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptBody {
    #[serde(default)]
    pub transcript: Option<String>,
}

impl SnapshotPayload {
    /// Decode a payload document.
    pub fn parse(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|e| Error::PayloadDecode(e.to_string()))
    }

    /// Raw transcript text, if the payload carries one.
    pub fn raw_transcript(&self) -> Option<&str> {
        self.transcript.as_ref()?.transcript.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    struct CannedTransport {
        pages: HashMap<String, String>,
    }

    #[async_trait::async_trait]
    impl Transport for CannedTransport {
        async fn get_text(&self, url: &Url) -> Result<String, Error> {
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| Error::HttpError(format!("status 404 for {url}")))
        }
    }

    fn root() -> Url {
        archive_root("https://archive.example.com/fire/").unwrap()
    }

    #[test]
    fn test_archive_root_appends_slash() {
        let url = archive_root("https://archive.example.com/fire").unwrap();
        assert_eq!(url.as_str(), "https://archive.example.com/fire/");
        assert!(archive_root("not a url").is_err());
    }

    #[test]
    fn test_day_directory_unpadded() {
        let day = Utc.with_ymd_and_hms(2024, 1, 2, 1, 0, 0).unwrap();
        let dir = day_directory(&root(), day).unwrap();
        assert_eq!(dir.as_str(), "https://archive.example.com/fire/2024/1/2/");
    }

    #[test]
    fn test_day_directories_today_and_yesterday() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 30, 0).unwrap();
        let dirs = day_directories(&root(), now, 24).unwrap();
        let dirs: Vec<_> = dirs.iter().map(Url::as_str).collect();
        assert_eq!(
            dirs,
            vec!["https://archive.example.com/fire/2024/3/1/", "https://archive.example.com/fire/2024/2/29/"]
        );
    }

    #[test]
    fn test_day_directories_short_window_still_two() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let dirs = day_directories(&root(), now, 1).unwrap();
        assert_eq!(dirs.len(), 2);
        assert_eq!(dirs[1].as_str(), "https://archive.example.com/fire/2023/12/31/");
    }

    #[test]
    fn test_day_directories_long_window() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        assert_eq!(day_directories(&root(), now, 48).unwrap().len(), 3);
        assert_eq!(day_directories(&root(), now, 49).unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_list_snapshots_filters_extension() {
        let dir = "https://archive.example.com/fire/2024/1/2/";
        let html = r#"
            <a href="../">Parent</a>
            <a href="fire_20240102_010000.json">json</a>
            <a href="fire_20240102_010000.mp3">mp3</a>
            <a href="fire_20240102_010000.json">dup</a>
            <a href="notes.json">notes</a>
        "#;
        let transport = CannedTransport { pages: HashMap::from([(dir.to_string(), html.to_string())]) };

        let names = list_snapshots(&transport, &Url::parse(dir).unwrap(), ".json").await;

        let names: Vec<_> = names.into_iter().collect();
        assert_eq!(names, vec!["fire_20240102_010000.json", "notes.json"]);
    }

    #[tokio::test]
    async fn test_list_snapshots_unreachable_is_empty() {
        let transport = CannedTransport { pages: HashMap::new() };
        let dir = Url::parse("https://archive.example.com/fire/2024/1/2/").unwrap();

        assert!(list_snapshots(&transport, &dir, ".json").await.is_empty());
    }

    #[test]
    fn test_payload_transcript() {
        let body = r#"{"transcript": {"transcript": "Smoke reported.\n"}, "freq": 154.0}"#;
        let payload = SnapshotPayload::parse(body).unwrap();
        assert_eq!(payload.raw_transcript(), Some("Smoke reported.\n"));
    }

    #[test]
    fn test_payload_missing_or_null_transcript() {
        assert_eq!(SnapshotPayload::parse("{}").unwrap().raw_transcript(), None);
        assert_eq!(SnapshotPayload::parse(r#"{"transcript": null}"#).unwrap().raw_transcript(), None);
        assert_eq!(SnapshotPayload::parse(r#"{"transcript": {}}"#).unwrap().raw_transcript(), None);
        assert_eq!(
            SnapshotPayload::parse(r#"{"transcript": {"transcript": null}}"#)
                .unwrap()
                .raw_transcript(),
            None
        );
    }

    #[test]
    fn test_payload_malformed() {
        assert!(matches!(SnapshotPayload::parse("<html>"), Err(Error::PayloadDecode(_))));
        assert!(matches!(SnapshotPayload::parse(r#"{"transcript": "flat"}"#), Err(Error::PayloadDecode(_))));
        assert!(matches!(SnapshotPayload::parse("[1, 2]"), Err(Error::PayloadDecode(_))));
    }
}
