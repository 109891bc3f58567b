//! JavaScript-rendered page source
//!
//! Some upstream pages build their code lists in the browser. The
//! [`RenderedFetcher`] runs a headless Chromium-compatible browser as a
//! child process, lets background scripts run for a bounded virtual-time
//! budget and captures the serialised DOM from stdout.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use super::{Page, PageProvider};
use crate::config::{RendererConfig, MOBILE_USER_AGENT};
use crate::utils::error::FetchError;

/// Headless browser page provider
pub struct RenderedFetcher {
    browser_path: String,
    user_agent: String,
    navigation_timeout: Duration,
    script_wait: Duration,
}

impl Default for RenderedFetcher {
    fn default() -> Self {
        Self::new("chromium")
    }
}

impl RenderedFetcher {
    /// Browser at `browser_path` with the mobile identity, 20 s navigation
    /// timeout and a 3 s script budget
    pub fn new(browser_path: impl Into<String>) -> Self {
        Self {
            browser_path: browser_path.into(),
            user_agent: MOBILE_USER_AGENT.to_string(),
            navigation_timeout: Duration::from_secs(20),
            script_wait: Duration::from_millis(3000),
        }
    }

    pub fn from_config(config: &RendererConfig) -> Self {
        Self {
            browser_path: config.browser_path.clone(),
            user_agent: config.user_agent.clone(),
            navigation_timeout: Duration::from_secs(config.timeout_secs),
            script_wait: Duration::from_millis(config.script_wait_ms),
        }
    }

    /// Wall-clock limit for one render
    pub fn total_budget(&self) -> Duration {
        self.navigation_timeout + self.script_wait
    }

    /// Command line passed to the browser
    pub fn browser_args(&self, url: &str) -> Vec<String> {
        vec![
            "--headless".to_string(),
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--ignore-certificate-errors".to_string(),
            "--blink-settings=imagesEnabled=false".to_string(),
            format!("--user-agent={}", self.user_agent),
            format!("--virtual-time-budget={}", self.script_wait.as_millis()),
            "--dump-dom".to_string(),
            url.to_string(),
        ]
    }

    /// Render `url` and return the resulting DOM
    ///
    /// The child is killed if the future is dropped, including on timeout.
    ///
    /// # Errors
    ///
    /// - `FetchError::Render` if the browser cannot start or exits non-zero
    /// - `FetchError::Timeout` if rendering exceeds the budget
    #[instrument(skip(self), level = "debug")]
    pub async fn render(&self, url: &str) -> Result<String, FetchError> {
        let child = Command::new(&self.browser_path)
            .args(self.browser_args(url))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                FetchError::Render(format!("Failed to launch {}: {e}", self.browser_path))
            })?;

        debug!(pid = ?child.id(), "Browser started");

        let output = tokio::time::timeout(self.total_budget(), child.wait_with_output())
            .await
            .map_err(|_| {
                warn!(url, budget_ms = self.total_budget().as_millis(), "Render timed out");
                FetchError::Timeout
            })?
            .map_err(|e| FetchError::Render(format!("Browser I/O failed: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::Render(format!(
                "Browser exited with {}: {}",
                output.status,
                stderr.lines().last().unwrap_or_default()
            )));
        }

        let html = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(bytes = html.len(), "Rendered page captured");
        Ok(html)
    }
}

#[async_trait]
impl PageProvider for RenderedFetcher {
    async fn fetch_page(&self, url: &str) -> Result<Page, FetchError> {
        let html = self.render(url).await?;
        Ok(Page::new(url, html))
    }

    fn name(&self) -> &'static str {
        "rendered"
    }
}
