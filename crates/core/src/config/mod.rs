//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SCANROLL_*)
//! 2. TOML config file (`--config` or SCANROLL_CONFIG_FILE)
//! 3. Built-in defaults
//!
//! Every feed is one [`FeedConfig`]; the pipeline takes a feed and never
//! reads global state, so the same code serves any number of archives.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::filename::FilenamePattern;

mod validation;

pub use validation::ConfigError;

/// Environment variable naming a TOML config file.
pub const CONFIG_FILE_ENV: &str = "SCANROLL_CONFIG_FILE";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SCANROLL_*)
/// 2. TOML config file
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// User-Agent string for HTTP requests.
    ///
    /// Set via SCANROLL_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in milliseconds.
    ///
    /// Set via SCANROLL_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to read per response.
    ///
    /// Set via SCANROLL_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Directory holding per-feed cache databases.
    ///
    /// Set via SCANROLL_DATA_DIR environment variable.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory holding rendered transcripts and metadata.
    ///
    /// Set via SCANROLL_OUTPUT_DIR environment variable.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Configured feeds. Defaults to the built-in `fire` and `law1` feeds.
    #[serde(default = "default_feeds")]
    pub feeds: Vec<FeedConfig>,
}

/// One independently configured archive feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Feed name; also the stem of derived file names.
    pub name: String,

    /// Archive root; day directories live at `<base><year>/<month>/<day>/`.
    pub archive_base: String,

    /// Trailing window of snapshots to keep, in hours.
    #[serde(default = "default_window_hours")]
    pub window_hours: u32,

    pub filename: FilenamePattern,

    #[serde(default)]
    pub display: DisplayConfig,

    /// Ordered keyword tiers counted into the run metadata.
    #[serde(default)]
    pub keyword_tiers: Vec<KeywordTier>,

    /// Cache database path; derived from `data_dir` when unset.
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Rendered transcript path; derived from `output_dir` when unset.
    #[serde(default)]
    pub output_path: Option<PathBuf>,

    /// Metadata path; derived from `output_dir` when unset.
    #[serde(default)]
    pub meta_path: Option<PathBuf>,
}

/// How rendered lines present the capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// IANA timezone name, e.g. `America/Los_Angeles`.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// strftime pattern for the local timestamp.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    /// Text between the timestamp and the transcript.
    #[serde(default = "default_separator")]
    pub separator: String,
}

/// A named list of keywords, e.g. the "red" alert terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordTier {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Resolved filesystem locations for one feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPaths {
    pub db: PathBuf,
    pub output: PathBuf,
    pub meta: PathBuf,
}

fn default_user_agent() -> String {
    "RR-Transcript-Aggregator/1.0".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./transcript_data")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./transcript-cache")
}

fn default_window_hours() -> u32 {
    24
}

fn default_timezone() -> String {
    "UTC".into()
}

fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M:%S".into()
}

fn default_separator() -> String {
    ": ".into()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            timestamp_format: default_timestamp_format(),
            separator: default_separator(),
        }
    }
}

/// Severity keyword lists used by the scanner status page.
pub fn default_keyword_tiers() -> Vec<KeywordTier> {
    let tier = |name: &str, words: &[&str]| KeywordTier {
        name: name.into(),
        keywords: words.iter().map(|w| w.to_string()).collect(),
    };

    vec![
        tier(
            "red",
            &[
                "commercial fire",
                "cover fire",
                "flue fire",
                "structure fire",
                "urgent",
                "smoke",
                "accident",
                "grass fire",
                "burn",
                "vehicle fire",
                "mva",
                "nva ",
                "mba ",
                "explosion",
                "gunshot",
            ],
        ),
        tier("yellow", &["medical aid", "mutual aid", "flood", "power outage", "road closure", "water rescue"]),
        tier("orange", &["fire alarm", "fire investigation"]),
    ]
}

fn default_feeds() -> Vec<FeedConfig> {
    vec![
        FeedConfig {
            name: "fire".into(),
            archive_base: "https://archive.theroseburgreceiver.com/fire/".into(),
            window_hours: default_window_hours(),
            filename: FilenamePattern::new("fire", true),
            display: DisplayConfig {
                timezone: "America/Los_Angeles".into(),
                timestamp_format: "%m/%d/%Y %H:%M:%S".into(),
                separator: ": ".into(),
            },
            keyword_tiers: default_keyword_tiers(),
            db_path: None,
            output_path: None,
            meta_path: None,
        },
        FeedConfig {
            name: "law1".into(),
            archive_base: "https://archive.theroseburgreceiver.com/law1/".into(),
            window_hours: default_window_hours(),
            filename: FilenamePattern::new("law1", false),
            display: DisplayConfig {
                timezone: "UTC".into(),
                timestamp_format: "%Y-%m-%d %H:%M:%S UTC".into(),
                separator: " ".into(),
            },
            keyword_tiers: default_keyword_tiers(),
            db_path: None,
            output_path: None,
            meta_path: None,
        },
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
            feeds: default_feeds(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// The TOML file is `config_file` when given, otherwise the path in
    /// `SCANROLL_CONFIG_FILE` (if set).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read or parsed
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let file = config_file
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_FILE_ENV).map(PathBuf::from));

        if let Some(path) = file {
            if !path.is_file() {
                return Err(ConfigError::LoadFailed(format!("config file not found: {}", path.display())));
            }
            figment = figment.merge(Toml::file(&path));
        }

        figment = figment.merge(
            Env::prefixed("SCANROLL_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Look up a feed by name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no feed has that name.
    pub fn feed(&self, name: &str) -> Result<&FeedConfig, ConfigError> {
        self.feeds.iter().find(|f| f.name == name).ok_or_else(|| ConfigError::Missing {
            field: format!("feeds.{name}"),
            hint: format!(
                "configured feeds: {}",
                self.feeds.iter().map(|f| f.name.as_str()).collect::<Vec<_>>().join(", ")
            ),
        })
    }

    /// Resolve a feed's cache and output locations.
    pub fn paths_for(&self, feed: &FeedConfig) -> FeedPaths {
        let stem = format!("{}_last{}h", feed.name, feed.window_hours);
        FeedPaths {
            db: feed
                .db_path
                .clone()
                .unwrap_or_else(|| self.data_dir.join(format!("{}_cache.sqlite", feed.name))),
            output: feed
                .output_path
                .clone()
                .unwrap_or_else(|| self.output_dir.join(format!("{stem}.txt"))),
            meta: feed
                .meta_path
                .clone()
                .unwrap_or_else(|| self.output_dir.join(format!("{stem}_meta.json"))),
        }
    }
}

impl FeedConfig {
    /// Display timezone parsed from its IANA name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for unknown zone names.
    pub fn display_tz(&self) -> Result<Tz, ConfigError> {
        self.display.timezone.parse::<Tz>().map_err(|e| ConfigError::Invalid {
            field: format!("feeds.{}.display.timezone", self.name),
            reason: e.to_string(),
        })
    }
}
