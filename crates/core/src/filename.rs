//! Snapshot filename codec.
//!
//! Archive snapshots are published as `<prefix>_<YYYYMMDD>_<HHMMSS>[_<n>].<ext>`,
//! stamped in UTC. The filename is the snapshot identity; the codec is the only
//! place that decides whether a listing entry is a snapshot and when it was captured.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Shape of a feed's snapshot filenames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilenamePattern {
    /// Literal prefix before the date block, without the trailing `_`.
    pub prefix: String,

    /// Payload extension without the leading dot.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Accept a `_<digits>` same-second disambiguator before the extension.
    #[serde(default = "default_true")]
    pub allow_disambiguator: bool,
}

fn default_extension() -> String {
    "json".into()
}

fn default_true() -> bool {
    true
}

impl FilenamePattern {
    pub fn new(prefix: impl Into<String>, allow_disambiguator: bool) -> Self {
        Self { prefix: prefix.into(), extension: default_extension(), allow_disambiguator }
    }

    /// Dotted suffix that discovery filters listing entries by.
    pub fn dotted_extension(&self) -> String {
        format!(".{}", self.extension)
    }
}

/// Compiled codec for one feed.
#[derive(Debug, Clone)]
pub struct FilenameCodec {
    pattern: FilenamePattern,
    re: Regex,
}

impl FilenameCodec {
    /// Compile the codec for a pattern.
    ///
    /// Prefix and extension are matched literally.
    pub fn new(pattern: FilenamePattern) -> Result<Self, Error> {
        let suffix = if pattern.allow_disambiguator { r"(?:_[0-9]+)?" } else { "" };
        let source = format!(
            r"^{prefix}_([0-9]{{8}})_([0-9]{{6}}){suffix}\.{ext}$",
            prefix = regex::escape(&pattern.prefix),
            ext = regex::escape(&pattern.extension),
        );
        let re = Regex::new(&source).map_err(|e| Error::InvalidPattern(e.to_string()))?;
        Ok(Self { pattern, re })
    }

    pub fn pattern(&self) -> &FilenamePattern {
        &self.pattern
    }

    /// Decode the capture instant of a snapshot filename.
    ///
    /// Returns `None` for anything that is not a snapshot, including names whose
    /// digits do not form a real calendar date or clock time.
    pub fn decode(&self, name: &str) -> Option<DateTime<Utc>> {
        let caps = self.re.captures(name)?;
        let date = &caps[1];
        let time = &caps[2];

        let date = NaiveDate::from_ymd_opt(
            date[0..4].parse().ok()?,
            date[4..6].parse().ok()?,
            date[6..8].parse().ok()?,
        )?;
        let time =
            NaiveTime::from_hms_opt(time[0..2].parse().ok()?, time[2..4].parse().ok()?, time[4..6].parse().ok()?)?;

        Some(NaiveDateTime::new(date, time).and_utc())
    }

    /// Render the canonical identity for an instant (no disambiguator).
    pub fn encode(&self, at: &DateTime<Utc>) -> String {
        format!("{}_{}.{}", self.pattern.prefix, at.format("%Y%m%d_%H%M%S"), self.pattern.extension)
    }
}
