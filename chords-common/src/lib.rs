//! # Nano Chords Common Library
//!
//! Shared code for the chord-sheet scraper service:
//! - Song and search-result models returned over the API
//! - Configuration loading (CLI / ENV / TOML / compiled defaults)
//! - Common error type

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{SearchResultItem, Song, SongLine, SourceType};
