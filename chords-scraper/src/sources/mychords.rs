//! MyChords adapter
//!
//! Search goes through the site's autocomplete endpoint (JSON). Song pages
//! are plain server-rendered HTML; chords sit in `span.b-accord__symbol`
//! inside `.subline` blocks of `pline` rows.

use async_trait::async_trait;
use chords_common::{SearchResultItem, Song, SourceType};
use reqwest::Url;
use scraper::{ElementRef, Html, Node};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{
    parse_base_url, resolve_url, same_origin, selector, split_artist_title, LineCollector,
    SearchSource, UNKNOWN,
};
use crate::error::ScrapeError;
use crate::fetcher::PageFetcher;

pub const DOMAIN: &str = "mychords.net";

/// Autocomplete group holding songs (others are artists and albums)
pub const SONGS_GROUP: &str = "Песни";

const AUTOCOMPLETE_PATH: &str = "/ru/ajax/autocomplete";
const CHORD_CLASS: &str = "b-accord__symbol";

/// How a row of the song body is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// `single-line`: lyric or chord line as plain text
    PlainLine,
    /// `pline`: sublines mixing text with chord spans
    AnnotatedParagraph,
    /// Anything else renders as an empty line
    Other,
}

pub fn classify_row<'a>(classes: impl Iterator<Item = &'a str>) -> RowKind {
    let mut kind = RowKind::Other;
    for class in classes {
        match class {
            "single-line" => return RowKind::PlainLine,
            "pline" => kind = RowKind::AnnotatedParagraph,
            _ => {}
        }
    }
    kind
}

/// Concatenate `(text, is_chord)` tokens, wrapping chords as `{Chord}`
pub fn render_tokens(tokens: &[(String, bool)]) -> String {
    let mut out = String::new();
    for (text, is_chord) in tokens {
        if *is_chord {
            out.push('{');
            out.push_str(text.trim());
            out.push('}');
        } else {
            out.push_str(text);
        }
    }
    out
}

pub struct MyChords {
    fetcher: Arc<PageFetcher>,
    base_url: Url,
    referer: String,
}

impl MyChords {
    pub fn new(fetcher: Arc<PageFetcher>, base_url: &str) -> Result<Self, ScrapeError> {
        let base_url = parse_base_url(base_url)?;
        let referer = resolve_url(&base_url, "/")?.to_string();
        Ok(Self {
            fetcher,
            base_url,
            referer,
        })
    }

    pub fn handles(&self, url: &Url) -> bool {
        url.host_str().is_some_and(|host| host.contains(DOMAIN)) || same_origin(url, &self.base_url)
    }

    pub async fn try_search(&self, query: &str) -> Result<Vec<SearchResultItem>, ScrapeError> {
        let url = resolve_url(&self.base_url, AUTOCOMPLETE_PATH)?;
        let body = self
            .fetcher
            .fetch(
                url.as_str(),
                &[("q", query)],
                &[
                    ("X-Requested-With", "XMLHttpRequest"),
                    ("Referer", self.referer.as_str()),
                ],
            )
            .await
            .into_json(url.as_str())?;

        Ok(extract_suggestions(&body, &self.base_url))
    }

    /// Search results; empty on any failure
    pub async fn search(&self, query: &str) -> Vec<SearchResultItem> {
        self.try_search(query).await.unwrap_or_else(|e| {
            warn!(query = %query, error = %e, "MC search failed");
            Vec::new()
        })
    }

    pub async fn try_parse_song(&self, url: &str) -> Result<Song, ScrapeError> {
        let html = self
            .fetcher
            .fetch(url, &[], &[("Referer", self.referer.as_str())])
            .await
            .into_text(url)?;
        extract_song(&html)
    }

    /// Parsed song page; `None` when missing or unparseable
    pub async fn parse_song(&self, url: &str) -> Option<Song> {
        self.try_parse_song(url)
            .await
            .map_err(|e| warn!(url = %url, error = %e, "MC parse failed"))
            .ok()
    }
}

#[async_trait]
impl SearchSource for MyChords {
    fn source_type(&self) -> SourceType {
        SourceType::MyChords
    }

    async fn search_source(&self, query: &str) -> Result<Vec<SearchResultItem>, ScrapeError> {
        self.try_search(query).await
    }
}

/// Song entries from an autocomplete response
///
/// Expected shape: `{"suggestions": [{"value": "Artist - Song", "data":
/// {"url": "/ru/...", "group": "Песни"}}]}`.
pub fn extract_suggestions(body: &Value, base: &Url) -> Vec<SearchResultItem> {
    let Some(suggestions) = body.get("suggestions").and_then(Value::as_array) else {
        debug!("Autocomplete response has no suggestions");
        return Vec::new();
    };

    suggestions
        .iter()
        .filter_map(|item| {
            let data = item.get("data")?;
            if data.get("group").and_then(Value::as_str) != Some(SONGS_GROUP) {
                return None;
            }
            let value = item.get("value").and_then(Value::as_str).unwrap_or_default();
            let link = data.get("url").and_then(Value::as_str).unwrap_or_default();
            if value.is_empty() || link.is_empty() {
                return None;
            }
            let url = resolve_url(base, link).ok()?;
            let (artist, title) = split_artist_title(value);
            Some(SearchResultItem::new(
                title,
                artist,
                url.to_string(),
                SourceType::MyChords,
            ))
        })
        .collect()
}

/// Artist and title from a page `<title>`
///
/// "Artist - Song, аккорды ..." gives ("Artist", "Song"); no separator
/// gives both `Unknown`.
pub fn split_page_title(page_title: &str) -> (String, String) {
    let mut parts = page_title.split(" - ");
    match (parts.next(), parts.next()) {
        (Some(artist), Some(rest)) => {
            let title = rest.split(',').next().unwrap_or_default();
            (artist.trim().to_string(), title.trim().to_string())
        }
        _ => (UNKNOWN.to_string(), UNKNOWN.to_string()),
    }
}

/// Build a song from a MyChords page
pub fn extract_song(html: &str) -> Result<Song, ScrapeError> {
    let document = Html::parse_document(html);

    let title_selector = selector("title")?;
    let page_title: String = document
        .select(&title_selector)
        .next()
        .ok_or_else(|| ScrapeError::Malformed("page has no <title>".to_string()))?
        .text()
        .collect();
    let (artist, title) = split_page_title(&page_title);

    let container_selector = selector(r#"div[itemprop="text"]"#)?;
    let container = document
        .select(&container_selector)
        .next()
        .ok_or_else(|| ScrapeError::Malformed("song text container not found".to_string()))?;

    let subline_selector = selector(".subline")?;
    let mut lines = LineCollector::new();
    for row in container.children().filter_map(ElementRef::wrap) {
        if row.value().name() != "div" {
            continue;
        }
        let text = match classify_row(row.value().classes()) {
            RowKind::PlainLine => stripped_text(row),
            RowKind::AnnotatedParagraph => row
                .select(&subline_selector)
                .map(|subline| render_tokens(&subline_tokens(subline)))
                .collect(),
            RowKind::Other => String::new(),
        };
        lines.push(text.replace('\u{a0}', " ").trim());
    }

    Ok(Song {
        title,
        artist,
        lines: lines.finish(),
    })
}

/// Every descendant text node trimmed, then joined
fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

/// Direct children of a subline as `(text, is_chord)` tokens
fn subline_tokens(subline: ElementRef<'_>) -> Vec<(String, bool)> {
    subline
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some((String::from(&**text), false)),
            Node::Element(element) => {
                let full = ElementRef::wrap(child)?.text().collect::<String>();
                let is_chord = element.name() == "span" && element.classes().any(|c| c == CHORD_CLASS);
                Some((full, is_chord))
            }
            _ => None,
        })
        .collect()
}
