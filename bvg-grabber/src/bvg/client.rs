//! BVG mobile site HTTP client.
//!
//! Both boards are plain GET endpoints that answer with markup. The
//! `input` parameter must be ISO-8859-1, so query strings are encoded
//! byte-wise here rather than through reqwest's UTF-8 serializer.

use tracing::debug;

use crate::domain::Station;

use super::error::BvgError;
use super::query::{ActualQuery, ScheduledQuery};

/// Default timetable (scheduled departures) endpoint.
const DEFAULT_SCHEDULED_URL: &str = "http://mobil.bvg.de/Fahrinfo/bin/stboard.bin/dox";

/// Default live (actual departures) endpoint.
const DEFAULT_ACTUAL_URL: &str = "http://mobil.bvg.de/IstAbfahrtzeiten/index/mobil";

/// Default number of scheduled departures to ask for.
const DEFAULT_LIMIT: u32 = 5;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of body characters kept in API error messages.
const ERROR_BODY_CHARS: usize = 500;

/// Configuration for the BVG client.
#[derive(Debug, Clone)]
pub struct BvgConfig {
    /// Timetable endpoint
    pub scheduled_url: String,
    /// Live departures endpoint
    pub actual_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Scheduled departures requested when the caller gives no limit
    pub default_limit: u32,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for BvgConfig {
    fn default() -> Self {
        Self {
            scheduled_url: DEFAULT_SCHEDULED_URL.to_string(),
            actual_url: DEFAULT_ACTUAL_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_limit: DEFAULT_LIMIT,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl BvgConfig {
    /// Create a config pointing at the production endpoints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom timetable endpoint (for testing).
    pub fn with_scheduled_url(mut self, url: impl Into<String>) -> Self {
        self.scheduled_url = url.into();
        self
    }

    /// Set a custom live endpoint (for testing).
    pub fn with_actual_url(mut self, url: impl Into<String>) -> Self {
        self.actual_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the default scheduled limit.
    pub fn with_default_limit(mut self, limit: u32) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// BVG board client.
///
/// Cheap to clone; queries built from it share the connection pool.
#[derive(Debug, Clone)]
pub struct BvgClient {
    http: reqwest::Client,
    config: BvgConfig,
}

impl BvgClient {
    /// Create a new client with the given configuration.
    pub fn new(config: BvgConfig) -> Result<Self, BvgError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &BvgConfig {
        &self.config
    }

    /// Timetable query for `station`, all vehicles, default limit.
    pub fn scheduled(&self, station: Station) -> ScheduledQuery {
        ScheduledQuery::new(self.clone(), station)
    }

    /// Live bus departures for `station`.
    pub fn actual(&self, station: Station) -> ActualQuery {
        ActualQuery::new(self.clone(), station)
    }

    /// GET `url` with the given parameters and return the page body.
    pub(crate) async fn fetch(
        &self,
        url: &str,
        params: &[(&str, Vec<u8>)],
    ) -> Result<String, BvgError> {
        let separator = if url.contains('?') { '&' } else { '?' };
        let full_url = format!("{url}{separator}{}", encode_query(params));

        debug!(url = %full_url, "requesting board");
        let response = self.http.get(&full_url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BvgError::Api {
                status: status.as_u16(),
                message: body.chars().take(ERROR_BODY_CHARS).collect(),
            });
        }

        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "received board");
        Ok(body)
    }
}

/// Percent-encode query parameters byte by byte.
pub(crate) fn encode_query(params: &[(&str, Vec<u8>)]) -> String {
    params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode_binary(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = BvgConfig::new()
            .with_scheduled_url("http://localhost:8080/dox")
            .with_actual_url("http://localhost:8080/live")
            .with_timeout(60)
            .with_default_limit(12)
            .with_user_agent("test-agent");

        assert_eq!(config.scheduled_url, "http://localhost:8080/dox");
        assert_eq!(config.actual_url, "http://localhost:8080/live");
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.default_limit, 12);
        assert_eq!(config.user_agent, "test-agent");
    }

    #[test]
    fn config_defaults() {
        let config = BvgConfig::new();

        assert_eq!(config.scheduled_url, DEFAULT_SCHEDULED_URL);
        assert_eq!(config.actual_url, DEFAULT_ACTUAL_URL);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.default_limit, 5);
        assert!(config.user_agent.starts_with("bvg-grabber/"));
    }

    #[test]
    fn client_creation() {
        let client = BvgClient::new(BvgConfig::new());
        assert!(client.is_ok());
    }

    #[test]
    fn encodes_latin1_bytes() {
        let params = [
            ("input", b"G\xF6rlitzer Bahnhof".to_vec()),
            ("start", b"yes".to_vec()),
        ];
        let query = encode_query(&params).to_ascii_lowercase();
        assert_eq!(query, "input=g%f6rlitzer%20bahnhof&start=yes");
    }

    #[test]
    fn encodes_reserved_characters() {
        let params = [("input", b"S+U Alexanderplatz & Co".to_vec())];
        let query = encode_query(&params).to_ascii_lowercase();
        assert_eq!(query, "input=s%2bu%20alexanderplatz%20%26%20co");
    }
}
