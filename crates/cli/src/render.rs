//! Window view rendering and run metadata.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use scanroll_client::KeywordMatcher;
use scanroll_core::{CacheEntry, DisplayConfig};

/// Status summary written next to the rendered transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunMetadata {
    pub generated_utc: String,
    pub window_hours: u32,
    pub lines: usize,
    pub inserted_this_run: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_hits: Option<BTreeMap<String, usize>>,
}

impl RunMetadata {
    pub fn new(
        generated_at: DateTime<Utc>, window_hours: u32, entries: &[CacheEntry], inserted: usize,
        matcher: &KeywordMatcher,
    ) -> Self {
        let keyword_hits = (!matcher.is_empty()).then(|| matcher.count_hits(entries.iter().map(|e| e.text.as_str())));
        Self {
            generated_utc: generated_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            window_hours,
            lines: entries.len(),
            inserted_this_run: inserted,
            keyword_hits,
        }
    }
}

/// One display line: local timestamp, separator, transcript.
pub fn render_line(entry: &CacheEntry, tz: &Tz, display: &DisplayConfig) -> String {
    let stamp = entry.captured_at.with_timezone(tz).format(&display.timestamp_format);
    format!("{stamp}{}{}", display.separator, entry.text)
}

/// Render entries in the order given, one newline-terminated line each.
pub fn render(entries: &[CacheEntry], tz: &Tz, display: &DisplayConfig) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&render_line(entry, tz, display));
        out.push('\n');
    }
    out
}
