//! Error types for chords-scraper
//!
//! `ScrapeError` is what adapters return internally. The public adapter
//! operations collapse it to an empty list or `None`; the HTTP layer maps it
//! to `ApiError` so the cause is still visible in the response body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure while fetching or extracting upstream content
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Upstream answered 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// Timeout, connection failure, or non-404 error status
    #[error("Upstream unavailable: {url}: {reason}")]
    Unavailable { url: String, reason: String },

    /// Expected container, attribute, JSON path or body was missing
    #[error("Malformed upstream page: {0}")]
    Malformed(String),

    /// URL could not be parsed or resolved
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// CSS selector failed to compile
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Song missing upstream (404)
    #[error("Song not found: {0}")]
    SongNotFound(String),

    /// Upstream unreachable; still reported as 404 to keep the client contract
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Upstream page could not be parsed (404)
    #[error("Malformed page: {0}")]
    MalformedPage(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<ScrapeError> for ApiError {
    fn from(err: ScrapeError) -> Self {
        match err {
            ScrapeError::NotFound(_) => ApiError::SongNotFound(err.to_string()),
            ScrapeError::Unavailable { .. } => ApiError::UpstreamUnavailable(err.to_string()),
            ScrapeError::Malformed(_) | ScrapeError::InvalidUrl(_) => {
                ApiError::MalformedPage(err.to_string())
            }
            ScrapeError::InvalidSelector(_) | ScrapeError::Client(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::SongNotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::UpstreamUnavailable(msg) => {
                (StatusCode::NOT_FOUND, "UPSTREAM_UNAVAILABLE", msg)
            }
            ApiError::MalformedPage(msg) => (StatusCode::NOT_FOUND, "MALFORMED_PAGE", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
