//! HTTP API handlers for chords-scraper

pub mod buildinfo;
pub mod debug;
pub mod health;
pub mod parse;
pub mod search;

pub use buildinfo::get_build_info;
pub use debug::debug_html;
pub use health::{health_routes, root};
pub use parse::parse;
pub use search::{search, top};
