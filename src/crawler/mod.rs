//! Page retrieval
//!
//! Adapters never talk to the network directly. They ask a [`PageProvider`]
//! for the HTML of a URL and parse the returned [`Page`] synchronously, since
//! `scraper::Html` cannot be held across an await point.
//!
//! - [`fetcher::StaticFetcher`] - plain HTTP GET of the server-rendered page
//! - [`renderer::RenderedFetcher`] - page source after JavaScript has run

pub mod fetcher;
pub mod headers;
pub mod renderer;

use async_trait::async_trait;

use crate::utils::error::FetchError;

pub use fetcher::StaticFetcher;
pub use renderer::RenderedFetcher;

/// A fetched upstream page
#[derive(Debug, Clone)]
pub struct Page {
    /// URL the content was retrieved from
    pub url: String,

    /// HTML source
    pub html: String,
}

impl Page {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

/// Source of page HTML
#[async_trait]
pub trait PageProvider: Send + Sync {
    /// Retrieve the page at `url`
    async fn fetch_page(&self, url: &str) -> Result<Page, FetchError>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}
