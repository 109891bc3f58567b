//! Static HTTP fetcher
//!
//! Retrieves the server-rendered HTML of a wiki page with a single GET:
//! - desktop browser User-Agent, no cookies, no referer
//! - per-request timeout
//! - charset taken from `Content-Type` and decoded with `encoding_rs`

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use reqwest::{header::CONTENT_TYPE, Client, Response};
use std::time::Duration;
use tracing::{debug, instrument};

use super::headers::build_page_headers;
use super::{Page, PageProvider};
use crate::config::{FetcherConfig, DESKTOP_USER_AGENT};
use crate::utils::error::FetchError;

/// Plain HTTP page fetcher
pub struct StaticFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// User-Agent sent with every request
    user_agent: String,
}

impl StaticFetcher {
    /// Create a fetcher with the default desktop identity and a 10 s timeout
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(DESKTOP_USER_AGENT, Duration::from_secs(10))
    }

    /// Create a fetcher with a custom identity and timeout
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
        })
    }

    /// Build a fetcher from the `[fetcher]` config section
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn from_config(config: &FetcherConfig) -> Result<Self, FetchError> {
        Self::with_config(&config.user_agent, config.request_timeout())
    }

    /// Fetch the raw HTML at `url`
    ///
    /// # Errors
    ///
    /// - `FetchError::ServerError` for non-2xx responses
    /// - `FetchError::Timeout` when the request exceeds the timeout
    /// - `FetchError::Http` for other transport failures
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .headers(build_page_headers(&self.user_agent))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            debug!(url, status = status.as_u16(), "Upstream returned error status");
            return Err(FetchError::ServerError(status.as_u16()));
        }

        self.decode_response(response).await
    }

    async fn decode_response(&self, response: Response) -> Result<String, FetchError> {
        // Own the header value before the body consumes the response
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let bytes = response.bytes().await.map_err(map_transport_error)?;

        decode_bytes(&bytes, &content_type)
    }
}

#[async_trait]
impl PageProvider for StaticFetcher {
    async fn fetch_page(&self, url: &str) -> Result<Page, FetchError> {
        let html = self.fetch(url).await?;
        Ok(Page::new(url, html))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

fn map_transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Http(e)
    }
}

/// Charset label announced by a `Content-Type` header value
fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Decode a response body using the announced charset, UTF-8 otherwise
///
/// Malformed sequences are replaced rather than rejected; an unknown label
/// is a decode error.
///
/// # Errors
///
/// Returns `FetchError::Decode` if the announced charset is not recognised
pub fn decode_bytes(bytes: &[u8], content_type: &str) -> Result<String, FetchError> {
    let encoding = match charset_label(content_type) {
        Some(label) => Encoding::for_label(label.as_bytes())
            .ok_or_else(|| FetchError::Decode(format!("Unknown charset: {label}")))?,
        None => UTF_8,
    };

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!(encoding = encoding.name(), "Body contained malformed sequences");
    }

    Ok(text.into_owned())
}
