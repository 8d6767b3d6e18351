//! Tracing subscriber setup
//!
//! The subscriber is installed before configuration is read so that config
//! loading can log. It starts at a bootstrap level (RUST_LOG, else the CLI or
//! environment level, else `info`) and is switched to the configured level
//! once the TOML file is known, unless RUST_LOG pinned it.

use tracing::{warn, Subscriber};
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    reload,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

pub const DEFAULT_LEVEL: &str = "info";

/// Handle used to swap the level filter after configuration is loaded
pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Filter directive in effect before the config file is read
pub fn bootstrap_directive(
    rust_log: Option<String>,
    cli_level: Option<&str>,
    env_level: Option<String>,
) -> String {
    rust_log
        .filter(|d| !d.trim().is_empty())
        .or_else(|| cli_level.map(str::to_string))
        .or(env_level)
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
}

/// Registry with a reloadable level filter and a fmt layer writing to `writer`
pub fn build_subscriber<W>(
    filter: EnvFilter,
    writer: W,
) -> (impl Subscriber + Send + Sync + 'static, FilterHandle)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let (filter, handle) = reload::Layer::new(filter);
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer));
    (subscriber, handle)
}

/// Install the global subscriber at the bootstrap level
pub fn init(cli_level: Option<&str>) -> FilterHandle {
    let directive = bootstrap_directive(
        std::env::var("RUST_LOG").ok(),
        cli_level,
        std::env::var("CHORDS_LOG_LEVEL").ok(),
    );
    let (subscriber, handle) = build_subscriber(EnvFilter::new(directive), std::io::stdout);
    subscriber.init();
    handle
}

/// Switch to the configured level unless RUST_LOG is set
pub fn apply_configured_level(handle: &FilterHandle, level: &str) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    if let Err(e) = handle.reload(EnvFilter::new(level)) {
        warn!("Failed to apply log level {}: {}", level, e);
    }
}
