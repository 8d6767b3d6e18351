//! Raw fetch inspection
//!
//! Shows exactly what the fetcher hands to the extractors for a URL, which is
//! the first thing to look at when an upstream page layout changes.

use axum::{
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::fetcher::FetchResult;
use crate::AppState;

const FAILURE_PAGE: &str = "<h1>Error or 404</h1>";

#[derive(Debug, Deserialize)]
pub struct DebugQuery {
    pub url: Option<String>,
}

/// GET /debug/html?url=...
pub async fn debug_html(
    State(state): State<AppState>,
    Query(params): Query<DebugQuery>,
) -> ApiResult<Html<String>> {
    let url = params
        .url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::BadRequest("url is required".to_string()))?;

    Ok(Html(render(state.fetcher.fetch(&url, &[], &[]).await)))
}

fn render(result: FetchResult) -> String {
    match result {
        FetchResult::Text(text) => text,
        FetchResult::Json(value) => {
            let pretty = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
            format!("<pre>{}</pre>", escape_html(&pretty))
        }
        FetchResult::NotFound | FetchResult::Error(_) => FAILURE_PAGE.to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
