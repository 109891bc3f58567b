//! Error types for the coupon scraper
//!
//! This module defines the low-level error types raised while fetching
//! and parsing upstream pages.

use thiserror::Error;

/// Errors that can occur while retrieving a page
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Headless browser could not be launched or exited abnormally
    #[error("Render error: {0}")]
    Render(String),

    /// Content decoding error
    #[error("Decoding error: {0}")]
    Decode(String),
}

impl FetchError {
    /// Whether a later attempt could plausibly succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout | Self::Render(_) => true,
            Self::ServerError(status) => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::Decode(_) => false,
        }
    }
}

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ParseError {
    /// The page was parsed but no usable code was found
    #[error("No codes found on {0}")]
    NoCodesFound(String),
}
