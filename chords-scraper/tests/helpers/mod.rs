//! In-process stand-in for both chord sites
//!
//! One axum server per test, bound to an ephemeral port, serving canned
//! Ultimate Guitar and MyChords pages plus a few transport edge cases.

#![allow(dead_code)]

use axum::{
    extract::Query,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chords_common::config::ScraperConfig;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Serve the fixture router on 127.0.0.1:0 and return its address
pub async fn spawn_fixture() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Should bind fixture listener");
    let addr = listener.local_addr().expect("Should have local addr");
    tokio::spawn(async move {
        axum::serve(listener, fixture_router())
            .await
            .expect("Fixture server failed");
    });
    addr
}

/// Scraper config pointing Ultimate Guitar and MyChords at two fixture servers
pub fn config_for(ug: SocketAddr, mc: SocketAddr) -> ScraperConfig {
    ScraperConfig {
        timeout_secs: 5,
        ultimate_guitar_base_url: format!("http://{}", ug),
        mychords_base_url: format!("http://{}", mc),
        ..ScraperConfig::default()
    }
}

/// An address nothing listens on
pub async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Should bind");
    let addr = listener.local_addr().expect("Should have local addr");
    drop(listener);
    addr
}

/// Server answering every path with a page and counting the requests it saw
pub async fn spawn_counting() -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let app = Router::new().fallback(move || {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Html("<html><head><title>A - B</title></head><body></body></html>")
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Should bind counting listener");
    let addr = listener.local_addr().expect("Should have local addr");
    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("Counting server failed");
    });
    (addr, hits)
}

fn fixture_router() -> Router {
    Router::new()
        .route("/search.php", get(ug_search))
        .route("/explore", get(ug_explore))
        .route("/tab/nothing-else-matters", get(ug_tab))
        .route("/tab/empty", get(ug_empty_tab))
        .route("/tab/no-store", get(|| async { Html("<html><body>Blocked</body></html>") }))
        .route("/ru/ajax/autocomplete", get(mc_autocomplete))
        .route("/ru/kino/gruppa-krovi.html", get(mc_song))
        .route("/ru/broken.html", get(|| async { Html("<html><body><p>nothing</p></body></html>") }))
        .route("/cp1251", get(cp1251_page))
        .route("/json", get(|| async { Json(json!({"ok": true, "items": [1, 2]})) }))
        .route("/echo", get(echo))
        .route("/boom", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
}

/// HTML page with a UG `js-store` blob, escaped the way UG escapes it
pub fn ug_store_page(store: &Value) -> String {
    let escaped = store
        .to_string()
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!(
        "<!DOCTYPE html><html><head><title>Ultimate Guitar</title></head><body>\
         <div class=\"js-store\" data-content=\"{}\"></div></body></html>",
        escaped
    )
}

async fn ug_search(Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("search_type").map(String::as_str) != Some("title") {
        return StatusCode::BAD_REQUEST.into_response();
    }
    let query = params.get("value").cloned().unwrap_or_default();
    if query == "nothing" {
        return Html(ug_store_page(&json!({"store": {"page": {"data": {}}}}))).into_response();
    }

    let store = json!({"store": {"page": {"data": {"data": {"tabs": [
        {"type": "Chords", "song_name": format!("{} (chords)", query), "artist_name": "Metallica",
         "tab_url": "/tab/nothing-else-matters"},
        {"type": "Pro", "song_name": "Guitar Pro", "artist_name": "Metallica", "tab_url": "/tab/pro"},
        {"type": "Tab", "song_name": format!("{} (tab)", query), "artist_name": "Metallica",
         "tab_url": "/tab/tab"}
    ]}}}}});
    Html(ug_store_page(&store)).into_response()
}

async fn ug_explore(Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("type").map(String::as_str) != Some("300") {
        return StatusCode::BAD_REQUEST.into_response();
    }
    let store = json!({"store": {"page": {"data": {"data": {"tabs": []}, "results": [
        {"type": "Chords", "song_name": "Wonderwall", "artist_name": "Oasis", "tab_url": "/tab/wonderwall"},
        {"type": "Tab", "song_name": "Smoke on the Water", "artist_name": "Deep Purple", "tab_url": "/tab/smoke"},
        {"type": "Chords", "song_name": "Perfect", "artist_name": "Ed Sheeran", "tab_url": "/tab/perfect"}
    ]}}}});
    Html(ug_store_page(&store)).into_response()
}

async fn ug_tab() -> Html<String> {
    let store = json!({"store": {"page": {"data": {
        "tab": {"song_name": "Nothing Else Matters", "artist_name": "Metallica"},
        "tab_view": {"wiki_tab": {"content":
            "[Intro]\r\n[tab][ch]Em[/ch]  [ch]D[/ch]  [ch]C[/ch]\r\n[/tab]\r\n\r\n\r\n[Verse]\r\n\
             [tab][ch]Em[/ch]                [ch]D[/ch]\r\nSo close, no matter how far[/tab]"
        }}
    }}}});
    Html(ug_store_page(&store))
}

async fn ug_empty_tab() -> Html<String> {
    let store = json!({"store": {"page": {"data": {
        "tab": {"song_name": "Empty", "artist_name": "Nobody"},
        "tab_view": {"wiki_tab": {"content": ""}}
    }}}});
    Html(ug_store_page(&store))
}

async fn mc_autocomplete(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if headers.get("x-requested-with").and_then(|v| v.to_str().ok()) != Some("XMLHttpRequest") {
        return StatusCode::FORBIDDEN.into_response();
    }
    let query = params.get("q").cloned().unwrap_or_default();
    if query == "nothing" {
        return Json(json!({"suggestions": []})).into_response();
    }
    Json(json!({"suggestions": [
        {"value": format!("Кино - {}", query), "data": {"url": "/ru/kino/gruppa-krovi.html", "group": "Песни"}},
        {"value": "Кино", "data": {"url": "/ru/kino", "group": "Исполнители"}},
        {"value": "Кукушка", "data": {"url": "/ru/kino/kukushka.html", "group": "Песни"}}
    ]}))
    .into_response()
}

async fn mc_song() -> Html<&'static str> {
    Html(
        "<html><head><title>Кино - Группа крови, аккорды и текст песни</title></head><body>\
         <div itemprop=\"text\">\
         <div class=\"single-line\"><b>Вступление:</b> Am C F G</div>\
         <div class=\"spacer\"></div>\
         <div class=\"pline\"><div class=\"subline\">\
         <span class=\"b-accord__symbol\">Am</span>Теплое место, но&nbsp;улицы ждут</div></div>\
         <div class=\"spacer\"></div>\
         <div class=\"spacer\"></div>\
         <div class=\"pline\"><div class=\"subline\">\
         <span class=\"b-accord__symbol\">C</span>夢ならば</div></div>\
         </div></body></html>",
    )
}

async fn cp1251_page() -> Response {
    let text = "<html><head><title>Кино - Кукушка</title></head><body>\
                <p>Песен еще ненаписанных сколько, скажи, кукушка, пропой. \
                В городе мне жить или на выселках, камнем лежать или гореть звездой.</p>\
                </body></html>";
    let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode(text);
    ([(header::CONTENT_TYPE, "text/html")], bytes.into_owned()).into_response()
}

/// Request headers and query echoed back as JSON
async fn echo(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "cookie": header("cookie"),
        "user_agent": header("user-agent"),
        "accept_language": header("accept-language"),
        "referer": header("referer"),
        "query": params,
    }))
}
