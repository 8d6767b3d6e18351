//! chords-scraper library
//!
//! Fetches chord sheets from Ultimate Guitar and MyChords, normalizes them to
//! `{Chord}`-annotated lines with optional romaji, and serves them over HTTP.

use axum::Router;
use chords_common::config::ScraperConfig;
use chords_common::SourceType;
use reqwest::Url;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod aggregator;
pub mod api;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod romanizer;
pub mod sources;

use aggregator::Aggregator;
use error::ScrapeError;
use fetcher::PageFetcher;
use sources::{MyChords, UltimateGuitar};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared HTTP client, also used directly by `/debug/html`
    pub fetcher: Arc<PageFetcher>,
    pub ultimate_guitar: Arc<UltimateGuitar>,
    pub mychords: Arc<MyChords>,
    pub aggregator: Aggregator,
}

impl AppState {
    /// Build the fetcher and both adapters from configuration
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let fetcher = Arc::new(PageFetcher::new(config)?);
        let ultimate_guitar = Arc::new(UltimateGuitar::new(
            Arc::clone(&fetcher),
            &config.ultimate_guitar_base_url,
        )?);
        let mychords = Arc::new(MyChords::new(
            Arc::clone(&fetcher),
            &config.mychords_base_url,
        )?);
        let aggregator = Aggregator::new(ultimate_guitar.clone(), mychords.clone());

        Ok(Self {
            fetcher,
            ultimate_guitar,
            mychords,
            aggregator,
        })
    }

    /// Which adapter parses `url`; `None` for unparseable or foreign URLs
    pub fn source_for_url(&self, url: &str) -> Option<SourceType> {
        let url = Url::parse(url).ok()?;
        if self.mychords.handles(&url) {
            Some(SourceType::MyChords)
        } else if self.ultimate_guitar.handles(&url) {
            Some(SourceType::UltimateGuitar)
        } else {
            None
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/", get(api::root))
        .route("/search", get(api::search))
        .route("/top", get(api::top))
        .route("/parse", get(api::parse))
        .route("/debug/html", get(api::debug_html))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
