//! HoYoverse wiki code tables
//!
//! Genshin Impact and Honkai Star Rail publish their codes in fandom
//! wikitables with the same column order, `[code, server, rewards, date]`.
//! The two pages differ only in which tables hold codes, where the
//! date/status text lives and the keyword that introduces the date.

use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, instrument};

use super::{fetch_or_warn, CouponSource, SourceKind};
use crate::crawler::PageProvider;
use crate::error::Result;
use crate::models::{dedup_by_code, CouponRecord, CouponStatus, UNKNOWN_DATE, UNKNOWN_REWARD};
use crate::parser::selectors::WikiTableSelectors;
use crate::parser::{clean_reward, element_text, normalize_date, row_cells, CodeRules};

pub const GENSHIN_URL: &str = "https://genshin-impact.fandom.com/wiki/Promotional_Code";
pub const HONKAI_STAR_RAIL_URL: &str = "https://honkai-star-rail.fandom.com/wiki/Redemption_Code";

static DATE_IN_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\w+\s+\d{1,2},?\s+\d{4}|\d{1,2}\w{2}\s+\w+\s+\d{4}|\w+\s+\d{1,2}\w{2}|\d{1,2}\w{2}\s+\w+)",
    )
    .unwrap()
});

static BARE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z0-9]{8,}").unwrap());

const MIN_CELLS: usize = 4;

/// Where the date and status text sits in a row
#[derive(Debug, Clone, Copy)]
enum StatusCell {
    Index(usize),
    Last,
}

#[derive(Clone, Copy)]
struct WikiProfile {
    kind: SourceKind,
    selectors: WikiTableSelectors,
    status_cell: StatusCell,
    date_keyword: &'static str,
}

/// Adapter for a HoYoverse fandom code page
pub struct HoyoWikiSource {
    profile: WikiProfile,
    url: String,
    provider: Arc<dyn PageProvider>,
}

impl HoyoWikiSource {
    pub fn genshin(provider: Arc<dyn PageProvider>) -> Self {
        Self {
            profile: WikiProfile {
                kind: SourceKind::Genshin,
                selectors: WikiTableSelectors::sortable(),
                status_cell: StatusCell::Index(3),
                date_keyword: "Discovered:",
            },
            url: GENSHIN_URL.to_string(),
            provider,
        }
    }

    pub fn honkai_star_rail(provider: Arc<dyn PageProvider>) -> Self {
        Self {
            profile: WikiProfile {
                kind: SourceKind::HonkaiStarRail,
                selectors: WikiTableSelectors::any(),
                status_cell: StatusCell::Last,
                date_keyword: "Released:",
            },
            url: HONKAI_STAR_RAIL_URL.to_string(),
            provider,
        }
    }

    /// Point the adapter at another copy of the page
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Extract the active records from page HTML
    pub fn parse(&self, html: &str) -> Vec<CouponRecord> {
        let document = Html::parse_document(html);
        let selectors = self.profile.selectors;
        let mut records = Vec::new();

        for table in document.select(selectors.table) {
            for row in table.select(selectors.rows) {
                let cells = row_cells(&row);
                if cells.len() < MIN_CELLS {
                    continue;
                }

                let Some(record) = self.parse_row(&cells) else {
                    debug!(source = %self.profile.kind, "Skipping row without a valid code");
                    continue;
                };

                if record.status.is_active() {
                    records.push(record);
                } else {
                    debug!(source = %self.profile.kind, code = %record.code, "Skipping expired code");
                }
            }
        }

        dedup_by_code(records)
    }

    fn parse_row(&self, cells: &[ElementRef<'_>]) -> Option<CouponRecord> {
        let code = self.extract_code(&cells[0])?;
        let server = element_text(&cells[1]);

        let reward_index = if cells.len() >= 3 { 2 } else { 1 };
        let reward = self.extract_reward(&cells[reward_index]);

        let status_cell = match self.profile.status_cell {
            StatusCell::Index(i) => cells.get(i)?,
            StatusCell::Last => cells.last()?,
        };
        let status_text = element_text(status_cell);

        Some(CouponRecord::new(
            code,
            reward,
            self.extract_date(&status_text),
            CouponStatus::classify(&status_text),
            server,
        ))
    }

    /// Bold or `<code>` text first, then link text, then any long token
    fn extract_code(&self, cell: &ElementRef<'_>) -> Option<String> {
        let rules = CodeRules::HOYOVERSE;
        let selectors = self.profile.selectors;

        if let Some(element) = cell.select(selectors.code).next() {
            let text = element_text(&element);
            if rules.is_valid(&text) {
                return Some(text);
            }
        }

        for link in cell.select(selectors.links) {
            let text = element_text(&link);
            if rules.is_valid(&text) {
                return Some(text);
            }
        }

        let text = element_text(cell);
        BARE_CODE
            .find(&text)
            .map(|m| m.as_str())
            .filter(|code| rules.is_valid(code))
            .map(str::to_string)
    }

    fn extract_reward(&self, cell: &ElementRef<'_>) -> String {
        let items: Vec<String> = cell
            .select(self.profile.selectors.reward_items)
            .map(|item| clean_reward(&element_text(&item)))
            .filter(|reward| reward != UNKNOWN_REWARD)
            .collect();

        if items.is_empty() {
            clean_reward(&element_text(cell))
        } else {
            items.join(", ")
        }
    }

    fn extract_date(&self, text: &str) -> String {
        if let Some(m) = DATE_IN_CELL.find(text) {
            return normalize_date(m.as_str());
        }

        keyword_segment(text, self.profile.date_keyword)
            .map(normalize_date)
            .unwrap_or_else(|| UNKNOWN_DATE.to_string())
    }
}

/// Text between `keyword` and the following "Valid", if any
fn keyword_segment<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let start = text.find(keyword)? + keyword.len();
    let rest = &text[start..];
    let segment = rest.find("Valid").map_or(rest, |end| &rest[..end]).trim();
    (!segment.is_empty()).then_some(segment)
}

#[async_trait]
impl CouponSource for HoyoWikiSource {
    fn kind(&self) -> SourceKind {
        self.profile.kind
    }

    #[instrument(skip(self), fields(source = %self.profile.kind))]
    async fn active_coupons(&self) -> Result<Vec<CouponRecord>> {
        let Some(page) = fetch_or_warn(self.provider.as_ref(), self.profile.kind, &self.url).await
        else {
            return Ok(Vec::new());
        };

        let records = self.parse(&page.html);
        info!(count = records.len(), "Extracted active coupons");
        Ok(records)
    }
}
