//! Configuration loading
//!
//! Settings are resolved in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error: the service starts on defaults and
//! logs a warning. A TOML file that exists but cannot be parsed is.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Directory name used under the platform config dir
pub const APP_DIR_NAME: &str = "nano-chords";

/// Browser identity presented to both chord sites
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

pub const DEFAULT_ACCEPT_LANGUAGE: &str = "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7";

pub const DEFAULT_ULTIMATE_GUITAR_URL: &str = "https://www.ultimate-guitar.com";
pub const DEFAULT_MYCHORDS_URL: &str = "https://mychords.net";

/// Full configuration file layout
///
/// Every section is optional; absent keys fall back to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub scraper: ScraperConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Upstream fetch settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
    pub accept_language: String,
    pub ultimate_guitar_base_url: String,
    pub mychords_base_url: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            ultimate_guitar_base_url: DEFAULT_ULTIMATE_GUITAR_URL.to_string(),
            mychords_base_url: DEFAULT_MYCHORDS_URL.to_string(),
        }
    }
}

/// Values supplied on the command line
///
/// `None` means "not given", leaving lower-priority sources in effect.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the explicit file if given, else the platform default file, else defaults
    ///
    /// An explicitly requested file must exist.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) => Self::load(&path),
            None => {
                warn!("No config file found, using compiled defaults");
                Ok(Self::default())
            }
        }
    }

    /// Apply process environment variables on top of file values
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    ///
    /// Recognized keys: `CHORDS_HOST`, `CHORDS_PORT` (or `PORT`),
    /// `CHORDS_LOG_LEVEL`, `CHORDS_TIMEOUT_SECS`, `CHORDS_UG_BASE_URL`,
    /// `CHORDS_MC_BASE_URL`.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("CHORDS_HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("CHORDS_PORT").or_else(|| lookup("PORT")) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("Invalid port: {}", port)))?;
        }

        if let Some(level) = lookup("CHORDS_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(timeout) = lookup("CHORDS_TIMEOUT_SECS") {
            self.scraper.timeout_secs = timeout
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("Invalid timeout: {}", timeout)))?;
        }

        if let Some(url) = lookup("CHORDS_UG_BASE_URL") {
            self.scraper.ultimate_guitar_base_url = url;
        }

        if let Some(url) = lookup("CHORDS_MC_BASE_URL") {
            self.scraper.mychords_base_url = url;
        }

        Ok(())
    }

    /// Apply command-line values (highest priority)
    pub fn apply_cli(&mut self, cli: &CliOverrides) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(level) = &cli.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Reject values the service cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::Config("server.host must not be empty".to_string()));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(Error::Config(
                "scraper.timeout_secs must be greater than zero".to_string(),
            ));
        }
        for (key, url) in [
            ("scraper.ultimate_guitar_base_url", &self.scraper.ultimate_guitar_base_url),
            ("scraper.mychords_base_url", &self.scraper.mychords_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!("{} must be an http(s) URL: {}", key, url)));
            }
        }
        Ok(())
    }

    /// Full resolution: file, then ENV, then CLI, then validation
    pub fn resolve(explicit: Option<&Path>, cli: &CliOverrides) -> Result<Self> {
        let mut config = Self::load_or_default(explicit)?;
        config.apply_env_overrides()?;
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }
}

/// Locate the default configuration file for the platform, if one exists
///
/// Linux also checks `/etc/nano-chords/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc").join(APP_DIR_NAME).join("config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
