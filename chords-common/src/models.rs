//! Song and search-result models
//!
//! These are the shapes returned by the scraper API. Field names match the
//! JSON the mobile client already consumes.

use serde::{Deserialize, Serialize};

/// Upstream chord site a result or song came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    /// ultimate-guitar.com (JSON embedded in HTML)
    #[serde(rename = "ug")]
    UltimateGuitar,
    /// mychords.net (DOM with class-based line markup)
    #[serde(rename = "mc")]
    MyChords,
}

impl SourceType {
    /// Human-readable label shown next to each result
    pub fn label(self) -> &'static str {
        match self {
            SourceType::UltimateGuitar => "Ultimate Guitar",
            SourceType::MyChords => "MyChords",
        }
    }
}

/// One entry of a search or top-list response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub title: String,
    pub artist: String,
    /// Absolute URL of the song page
    pub url: String,
    pub source_label: String,
    pub source_type: SourceType,
}

impl SearchResultItem {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        url: impl Into<String>,
        source_type: SourceType,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            url: url.into(),
            source_label: source_type.label().to_string(),
            source_type,
        }
    }
}

/// One rendered line of a chord sheet
///
/// `original` carries chords inline as `{Am}` markers. `romaji` is empty when
/// the line had nothing to transliterate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SongLine {
    pub original: String,
    pub romaji: String,
}

impl SongLine {
    pub fn new(original: impl Into<String>, romaji: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            romaji: romaji.into(),
        }
    }

    /// Paragraph separator
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn is_blank(&self) -> bool {
        self.original.trim().is_empty()
    }
}

/// A parsed chord sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub artist: String,
    pub lines: Vec<SongLine>,
}
