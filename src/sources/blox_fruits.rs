//! Blox Fruits codes page
//!
//! Working codes sit in a progress-tracking table whose rows read
//! `[checkbox, code, reward, release date]`. Money rewards are rendered as a
//! currency span holding `$<amount>`.

use async_trait::async_trait;
use scraper::{ElementRef, Html};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{fetch_or_warn, CouponSource, SourceKind};
use crate::crawler::PageProvider;
use crate::error::Result;
use crate::models::{dedup_by_code, CouponRecord};
use crate::parser::selectors::{CODE_TAG, MONEY_SPAN, PROGRESS_TABLE, TABLE_ROWS, WORKING_CODES_TABLE};
use crate::parser::{clean_reward, element_text, normalize_date, row_cells, CodeRules};

pub const BLOX_FRUITS_URL: &str = "https://blox-fruits.fandom.com/wiki/Codes";

const MIN_CELLS: usize = 4;
const MIN_CODE_LEN: usize = 3;

/// Adapter for the Blox Fruits codes page
pub struct BloxFruitsSource {
    url: String,
    provider: Arc<dyn PageProvider>,
}

impl BloxFruitsSource {
    pub fn new(provider: Arc<dyn PageProvider>) -> Self {
        Self {
            url: BLOX_FRUITS_URL.to_string(),
            provider,
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Extract the working codes from page HTML
    ///
    /// The `#tpt-1` table is the working-codes list; older layouts without
    /// it are read from every progress-tracking table.
    pub fn parse(&self, html: &str) -> Vec<CouponRecord> {
        let document = Html::parse_document(html);

        let tables: Vec<ElementRef<'_>> = match document.select(&WORKING_CODES_TABLE).next() {
            Some(table) => vec![table],
            None => document.select(&PROGRESS_TABLE).collect(),
        };

        let mut records = Vec::new();
        for table in tables {
            for row in table.select(&TABLE_ROWS) {
                let cells = row_cells(&row);
                if cells.len() < MIN_CELLS {
                    continue;
                }

                match parse_row(&cells) {
                    Some(record) => records.push(record),
                    None => debug!(source = %SourceKind::BloxFruits, "Skipping incomplete row"),
                }
            }
        }

        dedup_by_code(records)
    }
}

fn parse_row(cells: &[ElementRef<'_>]) -> Option<CouponRecord> {
    let code = extract_code(&cells[1])?;
    let reward = extract_reward(&cells[2])?;
    let date = normalize_date(&element_text(&cells[3]));

    Some(CouponRecord::active(code, reward, date))
}

fn extract_code(cell: &ElementRef<'_>) -> Option<String> {
    let from_tag = cell
        .select(&CODE_TAG)
        .next()
        .map(|code| element_text(&code))
        .filter(|text| text.chars().count() >= MIN_CODE_LEN);

    let candidate = from_tag.or_else(|| {
        let text = element_text(cell);
        (!text.to_lowercase().contains("code") && text.chars().count() >= MIN_CODE_LEN)
            .then_some(text)
    })?;

    CodeRules::BLOX_FRUITS.is_valid(&candidate).then_some(candidate)
}

fn extract_reward(cell: &ElementRef<'_>) -> Option<String> {
    if let Some(money) = cell.select(&MONEY_SPAN).next() {
        let digits: String = element_text(&money)
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        if digits.is_empty() {
            return None;
        }
        return Some(format!("{digits} Money"));
    }

    let text = element_text(cell);
    if text.is_empty() || text.to_lowercase().contains("reward") {
        return None;
    }

    Some(clean_reward(&text))
}

#[async_trait]
impl CouponSource for BloxFruitsSource {
    fn kind(&self) -> SourceKind {
        SourceKind::BloxFruits
    }

    #[instrument(skip(self), fields(source = %SourceKind::BloxFruits))]
    async fn active_coupons(&self) -> Result<Vec<CouponRecord>> {
        let Some(page) = fetch_or_warn(self.provider.as_ref(), self.kind(), &self.url).await else {
            return Ok(Vec::new());
        };

        let records = self.parse(&page.html);
        info!(count = records.len(), "Extracted active codes");
        Ok(records)
    }
}
