//! Play Together coupon page
//!
//! The first article table lists `[code, valid until, rewards]` with one
//! reward per line.

use async_trait::async_trait;
use scraper::{ElementRef, Html};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{fetch_or_warn, CouponSource, SourceKind};
use crate::crawler::PageProvider;
use crate::error::Result;
use crate::models::{dedup_by_code, CouponRecord};
use crate::parser::selectors::{ARTICLE_TABLE, TABLE_ROWS};
use crate::parser::{element_text, html_fragment_to_list, row_cells, CodeRules};

pub const PLAY_TOGETHER_URL: &str = "https://playtogether.fandom.com/wiki/Coupon_Code";

const MIN_CELLS: usize = 3;

/// Adapter for the Play Together coupon page
pub struct PlayTogetherSource {
    url: String,
    provider: Arc<dyn PageProvider>,
}

impl PlayTogetherSource {
    pub fn new(provider: Arc<dyn PageProvider>) -> Self {
        Self {
            url: PLAY_TOGETHER_URL.to_string(),
            provider,
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn parse(&self, html: &str) -> Vec<CouponRecord> {
        let document = Html::parse_document(html);
        let Some(table) = document.select(&ARTICLE_TABLE).next() else {
            return Vec::new();
        };

        // First row is the header
        let records = table
            .select(&TABLE_ROWS)
            .skip(1)
            .filter_map(|row| {
                let cells = row_cells(&row);
                if cells.len() < MIN_CELLS {
                    return None;
                }
                let record = parse_row(&cells);
                if record.is_none() {
                    debug!(source = %SourceKind::PlayTogether, "Skipping row without a valid code");
                }
                record
            })
            .collect();

        dedup_by_code(records)
    }
}

fn parse_row(cells: &[ElementRef<'_>]) -> Option<CouponRecord> {
    let code: String = element_text(&cells[0])
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if !CodeRules::PLAY_TOGETHER.is_valid(&code) {
        return None;
    }

    let date = element_text(&cells[1]);
    let reward = html_fragment_to_list(&cells[2].inner_html());

    Some(CouponRecord::active(code, reward, date))
}

#[async_trait]
impl CouponSource for PlayTogetherSource {
    fn kind(&self) -> SourceKind {
        SourceKind::PlayTogether
    }

    #[instrument(skip(self), fields(source = %SourceKind::PlayTogether))]
    async fn active_coupons(&self) -> Result<Vec<CouponRecord>> {
        let Some(page) = fetch_or_warn(self.provider.as_ref(), self.kind(), &self.url).await else {
            return Ok(Vec::new());
        };

        let records = self.parse(&page.html);
        info!(count = records.len(), "Extracted active coupons");
        Ok(records)
    }
}
