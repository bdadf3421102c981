//! HTTP access to the snapshot archive.
//!
//! Every request carries the configured user agent and a whole-request
//! timeout. Bodies are read chunk by chunk and abandoned once they pass
//! `max_bytes`. Non-success statuses are errors; callers decide whether
//! that is fatal.

use bytes::{Bytes, BytesMut};
use reqwest::{Client, Url};
use std::time::{Duration, Instant};

use scanroll_core::{AppConfig, Error};

const DEFAULT_USER_AGENT: &str = "RR-Transcript-Aggregator/1.0";

/// Limits applied to every archive request.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    /// Largest body accepted, in bytes.
    pub max_bytes: usize,
    /// Covers connect, headers and body.
    pub timeout: Duration,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_secs(20),
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// A successful archive response.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub bytes: Bytes,
}

impl FetchResponse {
    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Source of remote text documents.
///
/// Listings and payloads are both plain GETs, so this is the only seam the
/// pipeline needs; tests drive it from canned pages.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url` and return its body as text.
    async fn get_text(&self, url: &Url) -> Result<String, Error>;
}

/// reqwest-backed [`Transport`].
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Build a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::HttpError` if the TLS backend cannot be initialized.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("cannot build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// GET `url`, enforcing the status and size limits.
    pub async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error> {
        let started = Instant::now();
        let mut response = self.http.get(url.clone()).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpError(format!("status {} for {url}", status.as_u16())));
        }

        let limit = self.config.max_bytes;
        if let Some(advertised) = response.content_length()
            && advertised > limit as u64
        {
            return Err(too_large(url, advertised, limit));
        }

        let final_url = response.url().clone();
        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(request_error)? {
            if body.len() + chunk.len() > limit {
                return Err(too_large(url, (body.len() + chunk.len()) as u64, limit));
            }
            body.extend_from_slice(&chunk);
        }

        let fetch_ms = started.elapsed().as_millis() as u64;
        tracing::debug!(%url, %final_url, bytes = body.len(), fetch_ms, "fetched");

        Ok(FetchResponse { bytes: body.freeze() })
    }
}

fn too_large(url: &Url, seen: u64, limit: usize) -> Error {
    Error::FetchTooLarge(format!("{url}: {seen} bytes exceeds {limit}"))
}

fn request_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(err.to_string())
    } else {
        Error::HttpError(format!("network error: {err}"))
    }
}

#[async_trait::async_trait]
impl Transport for FetchClient {
    async fn get_text(&self, url: &Url) -> Result<String, Error> {
        Ok(self.fetch(url).await?.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_from_app_config() {
        let app =
            AppConfig { user_agent: "scanroll-test/2".into(), timeout_ms: 1500, max_bytes: 1024, ..Default::default() };
        let config = FetchConfig::from(&app);
        assert_eq!(config.user_agent, "scanroll-test/2");
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.max_bytes, 1024);
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_default_config_matches_app_defaults() {
        let config = FetchConfig::from(&AppConfig::default());
        let fallback = FetchConfig::default();
        assert_eq!(config.user_agent, fallback.user_agent);
        assert_eq!(config.timeout, fallback.timeout);
        assert_eq!(config.max_bytes, fallback.max_bytes);
    }

    #[test]
    fn test_response_text_lossy() {
        let response = FetchResponse { bytes: Bytes::from_static(b"caf\xff ok") };
        assert_eq!(response.text(), "caf\u{fffd} ok");
    }

    #[test]
    fn test_too_large_message() {
        let url = Url::parse("https://archive.test/fire/a.json").unwrap();
        let err = too_large(&url, 2048, 1024);
        assert!(matches!(err, Error::FetchTooLarge(_)));
        assert!(err.to_string().contains("2048 bytes exceeds 1024"));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_is_error() {
        let client = FetchClient::new(FetchConfig { timeout: Duration::from_secs(2), ..Default::default() }).unwrap();
        let url = Url::parse("http://127.0.0.1:9/fire/2024/1/2/").unwrap();
        let result = client.get_text(&url).await;
        assert!(matches!(result, Err(Error::HttpError(_) | Error::FetchTimeout(_))));
    }
}
