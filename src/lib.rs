//! coupon_scraper - game redemption code aggregator
//!
//! Fetches the community wiki pages that publish promotional codes for
//! several games, lifts their loosely structured HTML into a uniform
//! [`CouponRecord`] shape and serves the active codes over a small JSON API.
//!
//! # Architecture
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Static and browser-rendered page retrieval
//! - [`parser`] - Date, reward and code normalisation shared by adapters
//! - [`sources`] - One adapter per upstream page
//! - [`server`] - HTTP routes, error envelope and health check
//! - [`models`] - Core data structures and types
//! - [`utils`] - Common utilities, retry and low-level errors
//!
//! # Example
//!
//! ```no_run
//! use coupon_scraper::config::Config;
//! use coupon_scraper::sources::{CouponSource, SourceKind, SourceRegistry};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let registry = SourceRegistry::from_config(&config)?;
//!     if let Some(source) = registry.get(SourceKind::Genshin) {
//!         for record in source.active_coupons().await? {
//!             println!("{record}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod parser;
pub mod server;
pub mod sources;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::{Page, PageProvider, RenderedFetcher, StaticFetcher};
    pub use crate::error::{Error, ErrorCategory, Result, ScraperErrorTrait};
    pub use crate::models::{CouponRecord, CouponStatus};
    pub use crate::server::ScraperServer;
    pub use crate::sources::{CouponSource, SourceKind, SourceRegistry};
}

// Direct re-exports for convenience
pub use models::{CouponRecord, CouponStatus};
