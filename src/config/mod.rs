//! Configuration management for the coupon scraper
//!
//! Configuration comes from built-in defaults, an optional TOML file and
//! `COUPON_SCRAPER_*` environment variables. Upstream page URLs are not
//! configurable; they live with their adapters.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Desktop browser identity sent by the static fetcher
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Mobile Chrome identity sent by the headless browser
pub const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 10; K) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Mobile Safari/537.36";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Static page fetcher configuration
    pub fetcher: FetcherConfig,

    /// Headless browser configuration
    pub renderer: RendererConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP façade configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the API listens on
    pub bind_address: String,

    /// Allow any origin
    pub enable_cors: bool,

    /// Trace every request
    pub enable_request_logging: bool,
}

/// Static fetcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent string
    pub user_agent: String,
}

/// Headless browser configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Use the browser at all; when off, JS-built pages fall back to a static fetch
    pub enabled: bool,

    /// Chromium-compatible executable
    pub browser_path: String,

    /// Navigation timeout in seconds
    pub timeout_secs: u64,

    /// Time granted to background scripts after load, in milliseconds
    pub script_wait_ms: u64,

    /// User agent string
    pub user_agent: String,

    /// Attempts per request for JS-built pages
    pub max_attempts: u32,

    /// Pause between attempts in milliseconds
    pub retry_delay_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: String::from("0.0.0.0:8080"),
            enable_cors: true,
            enable_request_logging: true,
        }
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
            user_agent: DESKTOP_USER_AGENT.to_string(),
        }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            browser_path: String::from("chromium"),
            timeout_secs: 20,
            script_wait_ms: 3000,
            user_agent: MOBILE_USER_AGENT.to_string(),
            max_attempts: 2,
            retry_delay_ms: 1000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(addr) = std::env::var("COUPON_SCRAPER_BIND_ADDRESS") {
            self.server.bind_address = addr;
        }
        if let Some(cors) = env_parse("COUPON_SCRAPER_ENABLE_CORS") {
            self.server.enable_cors = cors;
        }
        if let Some(secs) = env_parse("COUPON_SCRAPER_REQUEST_TIMEOUT") {
            self.fetcher.request_timeout_secs = secs;
        }
        if let Some(enabled) = env_parse("COUPON_SCRAPER_RENDERER_ENABLED") {
            self.renderer.enabled = enabled;
        }
        if let Ok(path) = std::env::var("COUPON_SCRAPER_BROWSER_PATH") {
            self.renderer.browser_path = path;
        }
        if let Ok(level) = std::env::var("COUPON_SCRAPER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("COUPON_SCRAPER_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.server
            .bind_address
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid bind_address: {}", self.server.bind_address))?;

        if self.fetcher.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.renderer.timeout_secs == 0 {
            anyhow::bail!("renderer.timeout_secs must be greater than 0");
        }

        if self.renderer.max_attempts == 0 {
            anyhow::bail!("renderer.max_attempts must be at least 1");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("logging.format must be 'text' or 'json'");
        }

        Ok(())
    }

    /// Parsed bind address
    pub fn bind_address(&self) -> Result<SocketAddr> {
        self.server
            .bind_address
            .parse()
            .with_context(|| format!("Invalid bind_address: {}", self.server.bind_address))
    }
}

impl FetcherConfig {
    /// Per-request timeout for static fetches
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl RendererConfig {
    /// Wall-clock budget for one render: navigation plus the script wait
    #[must_use]
    pub fn total_budget(&self) -> Duration {
        Duration::from_secs(self.timeout_secs) + Duration::from_millis(self.script_wait_ms)
    }
}
