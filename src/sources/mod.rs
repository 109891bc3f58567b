//! Per-site coupon adapters
//!
//! Every upstream page gets one [`CouponSource`]. An adapter fetches its page
//! through a [`PageProvider`], locates the region holding the codes, projects
//! each candidate to a [`CouponRecord`] and returns the active ones.
//!
//! - [`hoyo`] - Genshin Impact and Honkai Star Rail wikitables
//! - [`blox_fruits`] - Blox Fruits progress-tracking tables
//! - [`play_together`] - Play Together article table
//! - [`fc_mobile`] - FC Mobile free-text redeem page

pub mod blox_fruits;
pub mod fc_mobile;
pub mod hoyo;
pub mod play_together;

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

use crate::config::Config;
use crate::crawler::{Page, PageProvider, RenderedFetcher, StaticFetcher};
use crate::error::Result;
use crate::models::CouponRecord;
use crate::utils::retry::RetryConfig;

pub use blox_fruits::BloxFruitsSource;
pub use fc_mobile::FcMobileSource;
pub use hoyo::HoyoWikiSource;
pub use play_together::PlayTogetherSource;

/// Supported upstream sites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Genshin,
    HonkaiStarRail,
    BloxFruits,
    PlayTogether,
    FcMobile,
}

impl SourceKind {
    pub const ALL: [SourceKind; 5] = [
        Self::Genshin,
        Self::HonkaiStarRail,
        Self::BloxFruits,
        Self::PlayTogether,
        Self::FcMobile,
    ];

    /// Route segment and CLI name
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Genshin => "genshin",
            Self::HonkaiStarRail => "honkai-star-rail",
            Self::BloxFruits => "blox-fruits",
            Self::PlayTogether => "play-together",
            Self::FcMobile => "fc-mobile",
        }
    }

    /// Human-readable game name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Genshin => "Genshin Impact",
            Self::HonkaiStarRail => "Honkai Star Rail",
            Self::BloxFruits => "Blox Fruits",
            Self::PlayTogether => "Play Together",
            Self::FcMobile => "FC Mobile",
        }
    }

    /// `error` field of the failure envelope
    pub fn failure_message(&self) -> String {
        let noun = match self {
            Self::BloxFruits | Self::FcMobile => "codes",
            _ => "coupons",
        };
        format!("Failed to fetch {} {noun}", self.label())
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| format!("Unknown source: {s}"))
    }
}

/// One upstream page turned into a list of active coupons
#[async_trait]
pub trait CouponSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Fetch the page and return its active, de-duplicated records
    ///
    /// Transport failures on table pages are logged and yield an empty
    /// list; only unexpected failures surface as `Err`.
    async fn active_coupons(&self) -> Result<Vec<CouponRecord>>;
}

/// Fetch a page, logging and swallowing transport failures
pub(crate) async fn fetch_or_warn(
    provider: &dyn PageProvider,
    kind: SourceKind,
    url: &str,
) -> Option<Page> {
    match provider.fetch_page(url).await {
        Ok(page) => Some(page),
        Err(e) => {
            warn!(
                source = %kind,
                url,
                provider = provider.name(),
                error = %e,
                "Failed to fetch page"
            );
            None
        }
    }
}

/// The set of adapters served by the API
#[derive(Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Arc<dyn CouponSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an adapter, replacing any previous one of the same kind
    pub fn register(&mut self, source: Arc<dyn CouponSource>) {
        self.sources.retain(|s| s.kind() != source.kind());
        self.sources.push(source);
    }

    #[must_use]
    pub fn with(mut self, source: Arc<dyn CouponSource>) -> Self {
        self.register(source);
        self
    }

    pub fn get(&self, kind: SourceKind) -> Option<Arc<dyn CouponSource>> {
        self.sources.iter().find(|s| s.kind() == kind).cloned()
    }

    pub fn kinds(&self) -> Vec<SourceKind> {
        self.sources.iter().map(|s| s.kind()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Wire every adapter to its production page providers
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher: Arc<dyn PageProvider> = Arc::new(StaticFetcher::from_config(&config.fetcher)?);
        let renderer: Option<Arc<dyn PageProvider>> = config
            .renderer
            .enabled
            .then(|| Arc::new(RenderedFetcher::from_config(&config.renderer)) as Arc<dyn PageProvider>);
        let retry = RetryConfig::fixed(config.renderer.max_attempts, config.renderer.retry_delay_ms);

        Ok(Self::new()
            .with(Arc::new(HoyoWikiSource::genshin(fetcher.clone())))
            .with(Arc::new(HoyoWikiSource::honkai_star_rail(fetcher.clone())))
            .with(Arc::new(BloxFruitsSource::new(fetcher.clone())))
            .with(Arc::new(PlayTogetherSource::new(fetcher.clone())))
            .with(Arc::new(
                FcMobileSource::new(renderer, fetcher).with_retry(retry),
            )))
    }
}
