//! Search and popular-list endpoints
//!
//! Both always answer with a JSON list; upstream failures show up as fewer
//! (or zero) results, never as an error status.

use axum::{
    extract::{Query, State},
    Json,
};
use chords_common::SearchResultItem;
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Query parameters for /search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Free-text song query, at least one character
    pub q: Option<String>,
}

/// GET /search?q=...
///
/// Interleaved results from both sources.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Json<Vec<SearchResultItem>>> {
    let query = params
        .q
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("q must be at least 1 character".to_string()))?;

    info!(query = %query, "[SEARCH] Request");
    Ok(Json(state.aggregator.search(&query).await))
}

/// GET /top
///
/// Popular chord sheets from Ultimate Guitar.
pub async fn top(State(state): State<AppState>) -> Json<Vec<SearchResultItem>> {
    Json(state.ultimate_guitar.get_top().await)
}
