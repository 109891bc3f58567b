//! Unified error handling for the coupon_scraper crate
//!
//! Domain-specific errors from fetching and parsing are folded into a single
//! [`Error`] enum so that adapters and the HTTP façade share one `Result`
//! type.
//!
//! - [`ScraperErrorTrait`] - Common interface implemented by the error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum

use thiserror::Error;

pub use crate::utils::error::{FetchError, ParseError};

/// Common trait for coupon_scraper error types
pub trait ScraperErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, browser)
    Network,
    /// Parsing and data extraction errors
    Parsing,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Other => "other",
        }
    }
}

/// Unified error type for the coupon_scraper crate
#[derive(Error, Debug)]
pub enum Error {
    /// Fetch-specific errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse-specific errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Failure raised by an adapter outside fetching and parsing
    #[error("{0}")]
    Other(String),
}

impl ScraperErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Parse(ParseError::NoCodesFound(_)) => true,
            Self::Other(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) => ErrorCategory::Network,
            Self::Parse(_) => ErrorCategory::Parsing,
            Self::Other(_) => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other(context.into())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
