//! Ultimate Guitar adapter
//!
//! Every UG page ships its data as HTML-escaped JSON in the `data-content`
//! attribute of `div.js-store`. Search, explore and tab pages all use that
//! blob; only the path inside it differs.

use async_trait::async_trait;
use chords_common::{SearchResultItem, Song, SourceType};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::Html;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::json_path::{first_non_empty_array, JsonPath};
use super::{parse_base_url, resolve_url, same_origin, selector, LineCollector, SearchSource, UNKNOWN};
use crate::error::ScrapeError;
use crate::fetcher::PageFetcher;

pub const DOMAIN: &str = "ultimate-guitar.com";

/// Candidate lists, primary first
const TAB_LIST_PATHS: [JsonPath; 2] = [
    JsonPath::new(&["store", "page", "data", "data", "tabs"]),
    JsonPath::new(&["store", "page", "data", "results"]),
];

const SONG_NAME: JsonPath = JsonPath::new(&["store", "page", "data", "tab", "song_name"]);
const ARTIST_NAME: JsonPath = JsonPath::new(&["store", "page", "data", "tab", "artist_name"]);
const TAB_CONTENT: JsonPath =
    JsonPath::new(&["store", "page", "data", "tab_view", "wiki_tab", "content"]);

/// Explore page filtered to chords
const TOP_PAGE_TYPE: &str = "300";

static CHORD_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[ch\](.*?)\[/ch\]").expect("chord tag pattern is valid"));

/// Which candidates a listing keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabFilter {
    /// Chords or Tab, or an official item
    Search,
    /// Chords, or an official item
    Top,
}

impl TabFilter {
    pub fn accepts(self, item: &Value) -> bool {
        let official = item.get("marketing_type").and_then(Value::as_str) == Some("official");
        let kind = item.get("type").and_then(Value::as_str);
        official
            || match self {
                TabFilter::Search => matches!(kind, Some("Chords") | Some("Tab")),
                TabFilter::Top => kind == Some("Chords"),
            }
    }
}

pub struct UltimateGuitar {
    fetcher: Arc<PageFetcher>,
    base_url: Url,
}

impl UltimateGuitar {
    pub fn new(fetcher: Arc<PageFetcher>, base_url: &str) -> Result<Self, ScrapeError> {
        Ok(Self {
            fetcher,
            base_url: parse_base_url(base_url)?,
        })
    }

    /// True for URLs this adapter can parse
    pub fn handles(&self, url: &Url) -> bool {
        url.host_str().is_some_and(|host| host.contains(DOMAIN)) || same_origin(url, &self.base_url)
    }

    pub async fn try_search(&self, query: &str) -> Result<Vec<SearchResultItem>, ScrapeError> {
        let url = resolve_url(&self.base_url, "/search.php")?;
        let html = self
            .fetcher
            .fetch(url.as_str(), &[("search_type", "title"), ("value", query)], &[])
            .await
            .into_text(url.as_str())?;

        let store = extract_store_json(&html)?;
        Ok(extract_results(&store, TabFilter::Search, &self.base_url))
    }

    /// Search results; empty on any failure
    pub async fn search(&self, query: &str) -> Vec<SearchResultItem> {
        self.try_search(query).await.unwrap_or_else(|e| {
            warn!(query = %query, error = %e, "UG search failed");
            Vec::new()
        })
    }

    pub async fn try_get_top(&self) -> Result<Vec<SearchResultItem>, ScrapeError> {
        let url = resolve_url(&self.base_url, "/explore")?;
        let html = self
            .fetcher
            .fetch(url.as_str(), &[("type", TOP_PAGE_TYPE)], &[])
            .await
            .into_text(url.as_str())?;

        let store = extract_store_json(&html)?;
        let items = extract_results(&store, TabFilter::Top, &self.base_url);
        info!("[TOP] Found {} popular songs", items.len());
        Ok(items)
    }

    /// Popular chord sheets; empty on any failure
    pub async fn get_top(&self) -> Vec<SearchResultItem> {
        self.try_get_top().await.unwrap_or_else(|e| {
            warn!(error = %e, "[TOP] Failed to load popular songs");
            Vec::new()
        })
    }

    pub async fn try_parse_song(&self, url: &str) -> Result<Song, ScrapeError> {
        let html = self.fetcher.fetch(url, &[], &[]).await.into_text(url)?;
        let store = extract_store_json(&html)?;
        extract_song(&store)
    }

    /// Parsed tab page; `None` when missing, empty or unparseable
    pub async fn parse_song(&self, url: &str) -> Option<Song> {
        self.try_parse_song(url)
            .await
            .map_err(|e| warn!(url = %url, error = %e, "UG parse failed"))
            .ok()
    }
}

#[async_trait]
impl SearchSource for UltimateGuitar {
    fn source_type(&self) -> SourceType {
        SourceType::UltimateGuitar
    }

    async fn search_source(&self, query: &str) -> Result<Vec<SearchResultItem>, ScrapeError> {
        self.try_search(query).await
    }
}

/// Decode the `div.js-store` data blob
///
/// The HTML parser has already resolved the entity escaping of the attribute.
pub fn extract_store_json(html: &str) -> Result<Value, ScrapeError> {
    let document = Html::parse_document(html);
    let store_selector = selector("div.js-store")?;

    let store = document
        .select(&store_selector)
        .next()
        .ok_or_else(|| ScrapeError::Malformed("div.js-store not found".to_string()))?;
    let raw = store
        .value()
        .attr("data-content")
        .ok_or_else(|| ScrapeError::Malformed("js-store has no data-content".to_string()))?;

    serde_json::from_str(raw)
        .map_err(|e| ScrapeError::Malformed(format!("js-store JSON: {}", e)))
}

/// Turn the store's candidate list into results, keeping upstream order
///
/// Non-object candidates, filtered-out types and items without a URL are
/// skipped silently.
pub fn extract_results(store: &Value, filter: TabFilter, base: &Url) -> Vec<SearchResultItem> {
    let Some(candidates) = first_non_empty_array(store, &TAB_LIST_PATHS) else {
        debug!("No tab list at {} or {}", TAB_LIST_PATHS[0], TAB_LIST_PATHS[1]);
        return Vec::new();
    };

    candidates
        .iter()
        .filter(|item| item.is_object() && filter.accepts(item))
        .filter_map(|item| {
            let link = item.get("tab_url").and_then(Value::as_str)?;
            let url = resolve_url(base, link).ok()?;
            Some(SearchResultItem::new(
                text_field(item, "song_name"),
                text_field(item, "artist_name"),
                url.to_string(),
                SourceType::UltimateGuitar,
            ))
        })
        .collect()
}

fn text_field(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Build a song from a tab page store
pub fn extract_song(store: &Value) -> Result<Song, ScrapeError> {
    let content = TAB_CONTENT.lookup_str(store).unwrap_or_default();
    if content.is_empty() {
        return Err(ScrapeError::Malformed(format!("empty tab body at {}", TAB_CONTENT)));
    }

    let title = SONG_NAME.lookup_str(store).unwrap_or(UNKNOWN).to_string();
    let artist = ARTIST_NAME.lookup_str(store).unwrap_or(UNKNOWN).to_string();

    let mut lines = LineCollector::keeping_leading_blank();
    for line in normalize_content(content).split('\n') {
        lines.push(line.trim_end());
    }

    Ok(Song {
        title,
        artist,
        lines: lines.finish(),
    })
}

/// `[ch]Am[/ch]` becomes `{Am}`; `[tab]` block delimiters are dropped
pub fn normalize_content(content: &str) -> String {
    CHORD_TAG
        .replace_all(content, "{$1}")
        .replace("[tab]", "")
        .replace("[/tab]", "")
}
