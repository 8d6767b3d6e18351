//! Song page parsing endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use chords_common::{Song, SourceType};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ParseQuery {
    pub url: Option<String>,
}

/// GET /parse?url=...
///
/// The adapter is picked from the URL host before anything is fetched. Every
/// way a song can go missing is a 404; the error code tells them apart.
pub async fn parse(
    State(state): State<AppState>,
    Query(params): Query<ParseQuery>,
) -> ApiResult<Json<Song>> {
    let url = params
        .url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::BadRequest("url is required".to_string()))?;

    let source = state
        .source_for_url(&url)
        .ok_or_else(|| ApiError::BadRequest("Domain not supported".to_string()))?;

    info!(url = %url, source = source.label(), "[PARSE] Request");
    let song = match source {
        SourceType::UltimateGuitar => state.ultimate_guitar.try_parse_song(&url).await,
        SourceType::MyChords => state.mychords.try_parse_song(&url).await,
    };

    match song {
        Ok(song) => {
            info!(url = %url, lines = song.lines.len(), "[PARSE] {} - {}", song.artist, song.title);
            Ok(Json(song))
        }
        Err(e) => {
            warn!(url = %url, error = %e, "[PARSE] Song not available");
            Err(e.into())
        }
    }
}
