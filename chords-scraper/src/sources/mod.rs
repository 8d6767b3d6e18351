//! Chord site adapters
//!
//! Each adapter composes the fetcher, its own extractor and the romanizer
//! into search / top-list / parse-song for one site. This module holds what
//! both adapters share: the `SearchSource` seam used by the aggregator and the
//! line normalization every parsed song goes through.

pub mod json_path;
pub mod mychords;
pub mod ultimate_guitar;

pub use mychords::MyChords;
pub use ultimate_guitar::UltimateGuitar;

use async_trait::async_trait;
use chords_common::{SearchResultItem, SongLine, SourceType};
use reqwest::Url;
use scraper::Selector;

use crate::error::ScrapeError;
use crate::romanizer::romanize_line;

/// Artist/title placeholder when a site gives us nothing usable
pub const UNKNOWN: &str = "Unknown";

/// A site that can answer free-text song searches
#[async_trait]
pub trait SearchSource: Send + Sync {
    fn source_type(&self) -> SourceType;

    /// Results in upstream relevance order
    async fn search_source(&self, query: &str) -> Result<Vec<SearchResultItem>, ScrapeError>;
}

/// Accumulates song lines, romanizing each and collapsing blank runs
///
/// The output never holds two blanks in a row. By default a blank is kept
/// only directly after a non-blank line, so the output never starts with one;
/// `keeping_leading_blank` instead reduces a leading run to a single blank.
#[derive(Debug, Default)]
pub struct LineCollector {
    lines: Vec<SongLine>,
    keep_leading_blank: bool,
}

impl LineCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collector that keeps one blank for a leading run of blank lines
    pub fn keeping_leading_blank() -> Self {
        Self {
            lines: Vec::new(),
            keep_leading_blank: true,
        }
    }

    pub fn push(&mut self, text: &str) {
        if text.trim().is_empty() {
            let keep = match self.lines.last() {
                Some(line) => !line.is_blank(),
                None => self.keep_leading_blank,
            };
            if keep {
                self.lines.push(SongLine::blank());
            }
            return;
        }
        self.lines.push(SongLine::new(text, romanize_line(text)));
    }

    pub fn finish(self) -> Vec<SongLine> {
        self.lines
    }
}

/// Split "Artist - Title" on the first separator
///
/// Without a separator the whole string is the title.
pub fn split_artist_title(full: &str) -> (String, String) {
    match full.split_once(" - ") {
        Some((artist, title)) => (artist.trim().to_string(), title.trim().to_string()),
        None => (UNKNOWN.to_string(), full.trim().to_string()),
    }
}

pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, ScrapeError> {
    Url::parse(base_url).map_err(|e| ScrapeError::InvalidUrl(format!("{}: {}", base_url, e)))
}

/// Resolve a possibly relative link against a site origin
pub(crate) fn resolve_url(base: &Url, link: &str) -> Result<Url, ScrapeError> {
    base.join(link)
        .map_err(|e| ScrapeError::InvalidUrl(format!("{}: {}", link, e)))
}

/// True when `url` points at the configured origin (scheme-agnostic host + port)
pub(crate) fn same_origin(url: &Url, base: &Url) -> bool {
    url.host_str() == base.host_str() && url.port_or_known_default() == base.port_or_known_default()
}

pub(crate) fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::InvalidSelector(format!("{}: {}", css, e)))
}
