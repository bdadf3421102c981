//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use std::collections::HashSet;

use chrono::format::{Item, StrftimeItems};
use thiserror::Error;

use crate::config::{AppConfig, FeedConfig};

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - no feeds are configured, or two feeds share a name
    /// - any feed fails [`FeedConfig::validate`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.feeds.is_empty() {
            return Err(invalid("feeds", "at least one feed must be configured"));
        }

        let mut seen = HashSet::new();
        for feed in &self.feeds {
            feed.validate()?;
            if !seen.insert(feed.name.as_str()) {
                return Err(invalid("feeds", format!("duplicate feed name `{}`", feed.name)));
            }
        }

        Ok(())
    }
}

impl FeedConfig {
    /// Validate a single feed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the offending `feeds.<name>.*` field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let field = |f: &str| format!("feeds.{}.{f}", self.name);

        if self.name.is_empty() || !self.name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(invalid("feeds.name", format!("`{}` must be non-empty [A-Za-z0-9_-]", self.name)));
        }

        let base = url::Url::parse(&self.archive_base).map_err(|e| invalid(field("archive_base"), e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(field("archive_base"), format!("unsupported scheme: {}", base.scheme())));
        }

        if self.window_hours == 0 || self.window_hours > 168 {
            return Err(invalid(field("window_hours"), "must be between 1 and 168"));
        }

        if self.filename.prefix.is_empty() {
            return Err(invalid(field("filename.prefix"), "must not be empty"));
        }
        if self.filename.extension.is_empty() || self.filename.extension.starts_with('.') {
            return Err(invalid(field("filename.extension"), "must be non-empty and without a leading dot"));
        }

        self.display_tz()?;

        if self.display.timestamp_format.is_empty() {
            return Err(invalid(field("display.timestamp_format"), "must not be empty"));
        }
        if StrftimeItems::new(&self.display.timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(invalid(field("display.timestamp_format"), "contains an invalid strftime specifier"));
        }

        for tier in &self.keyword_tiers {
            if tier.name.is_empty() {
                return Err(invalid(field("keyword_tiers"), "tier name must not be empty"));
            }
            if tier.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(invalid(field("keyword_tiers"), format!("tier `{}` has an empty keyword", tier.name)));
            }
        }

        Ok(())
    }
}
