//! Tests for config loading

use coupon_scraper::config::{Config, DESKTOP_USER_AGENT, MOBILE_USER_AGENT};
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

const ENV_KEYS: &[&str] = &[
    "COUPON_SCRAPER_BIND_ADDRESS",
    "COUPON_SCRAPER_ENABLE_CORS",
    "COUPON_SCRAPER_REQUEST_TIMEOUT",
    "COUPON_SCRAPER_RENDERER_ENABLED",
    "COUPON_SCRAPER_BROWSER_PATH",
    "COUPON_SCRAPER_LOG_LEVEL",
    "COUPON_SCRAPER_LOG_FORMAT",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_file_exists() {
    let config_path = std::path::Path::new("config.toml");
    assert!(config_path.exists(), "config.toml should exist in project root");
}

#[test]
#[serial]
fn test_sample_config_loads() {
    clear_env();
    let config = Config::from_file(std::path::Path::new("config.toml")).unwrap();

    assert_eq!(config.server.bind_address, "0.0.0.0:8080");
    assert_eq!(config.fetcher.request_timeout_secs, 10);
    assert_eq!(config.renderer.timeout_secs, 20);
    assert_eq!(config.renderer.script_wait_ms, 3000);
    assert_eq!(config.renderer.max_attempts, 2);
}

#[test]
#[serial]
fn test_from_file_with_defaults() {
    clear_env();
    let file = write_config(
        r#"
[server]
bind_address = "127.0.0.1:9090"
enable_cors = false

[renderer]
browser_path = "/usr/bin/chromium-browser"
"#,
    );

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.server.bind_address, "127.0.0.1:9090");
    assert!(!config.server.enable_cors);
    assert_eq!(config.renderer.browser_path, "/usr/bin/chromium-browser");
    assert_eq!(config.renderer.user_agent, MOBILE_USER_AGENT);
    assert_eq!(config.fetcher.user_agent, DESKTOP_USER_AGENT);
}

#[test]
#[serial]
fn test_invalid_file_rejected() {
    clear_env();
    let malformed = write_config("[server\nbind_address = ");
    assert!(Config::from_file(malformed.path()).is_err());

    let zero_timeout = write_config("[fetcher]\nrequest_timeout_secs = 0\n");
    assert!(Config::from_file(zero_timeout.path()).is_err());

    assert!(Config::from_file(std::path::Path::new("/nonexistent/config.toml")).is_err());
}

#[test]
#[serial]
fn test_env_overrides() {
    clear_env();
    std::env::set_var("COUPON_SCRAPER_BIND_ADDRESS", "127.0.0.1:3000");
    std::env::set_var("COUPON_SCRAPER_RENDERER_ENABLED", "false");
    std::env::set_var("COUPON_SCRAPER_LOG_FORMAT", "json");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.server.bind_address, "127.0.0.1:3000");
    assert!(!config.renderer.enabled);
    assert_eq!(config.logging.format, "json");
}

#[test]
#[serial]
fn test_env_invalid_address_rejected() {
    clear_env();
    std::env::set_var("COUPON_SCRAPER_BIND_ADDRESS", "not an address");

    let result = Config::from_env();
    clear_env();

    assert!(result.is_err());
}
