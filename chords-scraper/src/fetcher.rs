//! Page fetcher
//!
//! Thin GET wrapper around one shared `reqwest::Client`. It knows nothing
//! about either chord site; it only guarantees:
//! - a request timeout always applies
//! - browser-like default headers, overridable per call
//! - the `tone=0` cookie on every request
//! - a 404 comes back as `FetchResult::NotFound`, every other failure as
//!   `FetchResult::Error`, never as a propagated error

use chords_common::config::ScraperConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, COOKIE};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::error::ScrapeError;

/// Cookie attached to every request; MyChords shows an interstitial without it
pub const FIXED_COOKIE: &str = "tone=0";

const DEFAULT_ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";

/// Outcome of a single fetch
///
/// Callers must check the tag; nothing here is raised.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    /// Body decoded with its detected encoding
    Text(String),
    /// Body of an `application/json` response
    Json(Value),
    /// HTTP 404
    NotFound,
    /// Any other failure, with a description
    Error(String),
}

impl FetchResult {
    /// Require an HTML/text body
    pub fn into_text(self, url: &str) -> Result<String, ScrapeError> {
        match self {
            FetchResult::Text(text) => Ok(text),
            FetchResult::Json(_) => Err(ScrapeError::Malformed(format!(
                "expected HTML from {}, got JSON",
                url
            ))),
            FetchResult::NotFound => Err(ScrapeError::NotFound(url.to_string())),
            FetchResult::Error(reason) => Err(ScrapeError::Unavailable {
                url: url.to_string(),
                reason,
            }),
        }
    }

    /// Require a JSON body
    pub fn into_json(self, url: &str) -> Result<Value, ScrapeError> {
        match self {
            FetchResult::Json(value) => Ok(value),
            FetchResult::Text(_) => Err(ScrapeError::Malformed(format!(
                "expected JSON from {}, got text",
                url
            ))),
            FetchResult::NotFound => Err(ScrapeError::NotFound(url.to_string())),
            FetchResult::Error(reason) => Err(ScrapeError::Unavailable {
                url: url.to_string(),
                reason,
            }),
        }
    }
}

/// Process-wide HTTP fetcher
///
/// Cheap to share behind an `Arc`; the inner client pools connections.
pub struct PageFetcher {
    http_client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .map_err(|e| ScrapeError::Client(format!("Invalid Accept-Language: {}", e)))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));

        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ScrapeError::Client(e.to_string()))?;

        Ok(Self { http_client })
    }

    /// GET `url` with optional query parameters and extra headers
    ///
    /// Extra headers replace defaults of the same name.
    pub async fn fetch(
        &self,
        url: &str,
        query: &[(&str, &str)],
        extra_headers: &[(&str, &str)],
    ) -> FetchResult {
        let mut request = self.http_client.get(url).header(COOKIE, FIXED_COOKIE);
        if !query.is_empty() {
            request = request.query(query);
        }
        for (name, value) in extra_headers {
            request = request.header(*name, *value);
        }

        debug!(url = %url, "[FETCH] GET");

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!(url = %url, error = %e, "[FETCH] Request failed");
                return FetchResult::Error(e.to_string());
            }
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            warn!(url = %url, "[FETCH] 404 Not Found");
            return FetchResult::NotFound;
        }
        if !status.is_success() {
            error!(url = %url, status = %status, "[FETCH] Unexpected status");
            return FetchResult::Error(format!("HTTP {}", status));
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);

        if is_json {
            return match response.json::<Value>().await {
                Ok(value) => FetchResult::Json(value),
                Err(e) => {
                    error!(url = %url, error = %e, "[FETCH] Invalid JSON body");
                    FetchResult::Error(e.to_string())
                }
            };
        }

        match response.bytes().await {
            Ok(bytes) => FetchResult::Text(decode_body(&bytes)),
            Err(e) => {
                error!(url = %url, error = %e, "[FETCH] Failed to read body");
                FetchResult::Error(e.to_string())
            }
        }
    }
}

/// Decode a body using its detected encoding rather than a fixed charset
///
/// A byte-order mark, when present, wins over detection.
pub fn decode_body(bytes: &[u8]) -> String {
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}
