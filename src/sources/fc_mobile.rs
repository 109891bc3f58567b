//! FC Mobile redeem-code page
//!
//! The forum page has no stable markup; codes are built client-side and
//! laid out as free text along the lines of
//! `Reward: 100 Gems 3rd October ABCD1234 COPY`, with expired entries
//! showing "Expired" instead of a copy button. Codes are lifted from the
//! visible text with three complementary scans:
//!
//! 1. copy-button blocks, the strongest signal of an active code
//! 2. date-delimited sections without "expired" in them
//! 3. `reward: ... <date>` blocks followed closely by a code
//!
//! The page is rendered in a headless browser first and fetched statically
//! when that fails or finds nothing, with a bounded retry around both.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use scraper::Html;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, instrument, warn};

use super::{CouponSource, SourceKind};
use crate::crawler::PageProvider;
use crate::error::{Error, Result, ScraperErrorTrait};
use crate::models::{dedup_by_code, CouponRecord, UNKNOWN_DATE, UNKNOWN_REWARD};
use crate::parser::{document_text, parse_day_month, CodeRules};
use crate::utils::error::ParseError;
use crate::utils::retry::{with_retry_if, RetryConfig};
use crate::utils::{normalize_whitespace, truncate_chars};

pub const FC_MOBILE_URL: &str = "https://www.fcmobileforum.com/fcmobile-redeem-codes";

/// Section rewards must be shorter than this before falling back to keywords
const MAX_SECTION_REWARD_CHARS: usize = 100;

/// How far past a reward block the code may appear
const REWARD_BLOCK_WINDOW: usize = 100;

const MONTH_NAMES: &str = "January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sept|Sep|Oct|Nov|Dec";

fn date_pattern() -> String {
    format!(r"\b\d{{1,2}}(?i:st|nd|rd|th)?\s+(?i:{MONTH_NAMES})\b")
}

static DATE_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(&date_pattern()).unwrap());

static COPY_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?:(?i:reward):\s*([^\n]*?)\s*)?({})\s+([A-Z0-9]{{6,20}})\s+(?i:copy)",
        date_pattern()
    ))
    .unwrap()
});

static REWARD_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i:reward):\s*([^\n]*?)\s*({})", date_pattern())).unwrap()
});

static CODE_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[A-Z0-9]{6,20}\b").unwrap());

fn is_valid_code(code: &str) -> bool {
    CodeRules::FC_MOBILE.is_valid(code)
}

/// Adapter for the FC Mobile forum page
pub struct FcMobileSource {
    url: String,
    renderer: Option<Arc<dyn PageProvider>>,
    fallback: Arc<dyn PageProvider>,
    retry: RetryConfig,
}

impl FcMobileSource {
    /// `renderer` is tried first on every attempt; `fallback` serves the
    /// static page when rendering fails or finds nothing
    pub fn new(renderer: Option<Arc<dyn PageProvider>>, fallback: Arc<dyn PageProvider>) -> Self {
        Self {
            url: FC_MOBILE_URL.to_string(),
            renderer,
            fallback,
            retry: RetryConfig::fixed(2, 1000),
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Extract active codes from page HTML
    pub fn parse(&self, html: &str) -> Vec<CouponRecord> {
        let document = Html::parse_document(html);
        self.parse_text(&document_text(&document))
    }

    /// Extract active codes from the visible page text, newest first
    pub fn parse_text(&self, text: &str) -> Vec<CouponRecord> {
        extract_codes(text, chrono::Local::now().year())
    }

    /// One rendered-then-static pass; no codes counts as a failure
    async fn attempt(&self) -> Result<Vec<CouponRecord>> {
        if let Some(renderer) = &self.renderer {
            match renderer.fetch_page(&self.url).await {
                Ok(page) => {
                    let records = self.parse(&page.html);
                    if !records.is_empty() {
                        return Ok(records);
                    }
                    debug!("Rendered page had no codes, trying static fetch");
                }
                Err(e) => warn!(error = %e, "Rendered fetch failed, trying static fetch"),
            }
        }

        let page = self.fallback.fetch_page(&self.url).await?;
        let records = self.parse(&page.html);
        if records.is_empty() {
            return Err(ParseError::NoCodesFound(self.url.clone()).into());
        }
        Ok(records)
    }
}

#[async_trait]
impl CouponSource for FcMobileSource {
    fn kind(&self) -> SourceKind {
        SourceKind::FcMobile
    }

    #[instrument(skip(self), fields(source = %SourceKind::FcMobile))]
    async fn active_coupons(&self) -> Result<Vec<CouponRecord>> {
        let result = with_retry_if(&self.retry, || self.attempt(), |e: &Error| {
            e.is_recoverable()
        })
        .await;

        match result {
            Ok(records) => {
                info!(count = records.len(), "Extracted active codes");
                Ok(records)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    category = e.category().as_str(),
                    "Giving up on FC Mobile codes"
                );
                Ok(Vec::new())
            }
        }
    }
}

/// Run every scan over `text` and order the merged result by date
fn extract_codes(text: &str, year: i32) -> Vec<CouponRecord> {
    let mut records = copy_button_codes(text);
    let mut seen: HashSet<String> = records.iter().map(|r| r.code.clone()).collect();

    for record in section_codes(text).into_iter().chain(reward_block_codes(text)) {
        if seen.insert(record.code.clone()) {
            records.push(record);
        }
    }

    let mut records = dedup_by_code(records);
    sort_newest_first(&mut records, year);
    debug!(count = records.len(), "Merged FC Mobile candidates");
    records
}

fn copy_button_codes(text: &str) -> Vec<CouponRecord> {
    COPY_BLOCK
        .captures_iter(text)
        .filter(|caps| is_valid_code(&caps[3]))
        .map(|caps| {
            let reward = caps.get(1).map_or("", |m| own_reward_text(m.as_str()));
            CouponRecord::active(&caps[3], normalize_whitespace(reward), &caps[2])
        })
        .collect()
}

/// A lazily captured reward can span earlier blocks. Only the text after
/// the last `reward:` label counts, and a date inside it means the label
/// belonged to an earlier block, leaving this code without a reward.
fn own_reward_text(captured: &str) -> &str {
    let lower = captured.to_ascii_lowercase();
    let reward = match lower.rfind("reward:") {
        Some(idx) => captured[idx + "reward:".len()..].trim(),
        None => captured.trim(),
    };

    if DATE_TOKEN.is_match(reward) {
        ""
    } else {
        reward
    }
}

/// Split at the start of every date token
fn split_sections(text: &str) -> Vec<&str> {
    let mut starts: Vec<usize> = DATE_TOKEN.find_iter(text).map(|m| m.start()).collect();
    if starts.first() != Some(&0) {
        starts.insert(0, 0);
    }

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            &text[start..end]
        })
        .filter(|section| !section.trim().is_empty())
        .collect()
}

fn section_codes(text: &str) -> Vec<CouponRecord> {
    let mut records: Vec<CouponRecord> = Vec::new();

    for section in split_sections(text) {
        if section.to_lowercase().contains("expired") {
            continue;
        }

        let date = DATE_TOKEN
            .find(section)
            .map_or(UNKNOWN_DATE, |m| m.as_str());

        for code in CODE_TOKEN.find_iter(section).map(|m| m.as_str()) {
            if !is_valid_code(code) || records.iter().any(|r| r.code == code) {
                continue;
            }
            records.push(CouponRecord::active(code, section_reward(section, code), date));
        }
    }

    records
}

/// Reward text after the section's `reward:` label, or the gem, pack and
/// point words it mentions
fn section_reward(section: &str, code: &str) -> String {
    let lower = section.to_ascii_lowercase();

    if let Some(idx) = lower.find("reward") {
        let after = &section[idx..];
        if let Some(colon) = after.find(':') {
            let reward = after[colon + 1..]
                .split_whitespace()
                .filter(|word| *word != code)
                .collect::<Vec<_>>()
                .join(" ");
            if !reward.is_empty() && reward.chars().count() < MAX_SECTION_REWARD_CHARS {
                return reward;
            }
        }
    }

    if lower.contains("gems") || lower.contains("pack") {
        let words: Vec<&str> = section
            .split_whitespace()
            .filter(|word| {
                let w = word.to_lowercase();
                w.contains("gem")
                    || w.contains("pack")
                    || w.contains("point")
                    || w.chars().all(|c| c.is_ascii_digit())
            })
            .collect();
        if !words.is_empty() {
            return words.join(" ");
        }
    }

    UNKNOWN_REWARD.to_string()
}

fn reward_block_codes(text: &str) -> Vec<CouponRecord> {
    let mut records: Vec<CouponRecord> = Vec::new();

    for caps in REWARD_BLOCK.captures_iter(text) {
        let Some(block) = caps.get(0) else {
            continue;
        };
        let window = truncate_chars(&text[block.end()..], REWARD_BLOCK_WINDOW);
        if window.to_lowercase().contains("expired") {
            continue;
        }

        let Some(code) = CODE_TOKEN
            .find_iter(window)
            .map(|m| m.as_str())
            .find(|code| is_valid_code(code))
        else {
            continue;
        };

        if records.iter().any(|r| r.code == code) {
            continue;
        }

        let reward = normalize_whitespace(own_reward_text(&caps[1]));
        records.push(CouponRecord::active(code, reward, &caps[2]));
    }

    records
}

/// Reorder dated records newest first within the positions they occupy;
/// records without a parsable date stay where they are
fn sort_newest_first(records: &mut [CouponRecord], year: i32) {
    let slots: Vec<(usize, NaiveDate)> = records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| parse_day_month(&r.date, year).map(|d| (i, d)))
        .collect();

    let mut dated: Vec<(NaiveDate, CouponRecord)> = slots
        .iter()
        .map(|&(i, date)| (date, records[i].clone()))
        .collect();
    dated.sort_by(|a, b| b.0.cmp(&a.0));

    for ((slot, _), (_, record)) in slots.into_iter().zip(dated) {
        records[slot] = record;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::Page;
    use crate::models::CouponStatus;
    use crate::utils::error::FetchError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const YEAR: i32 = 2025;

    fn codes(records: &[CouponRecord]) -> Vec<&str> {
        records.iter().map(|r| r.code.as_str()).collect()
    }

    #[test]
    fn test_copy_block() {
        let records = extract_codes("Reward: 100 Gems 3rd October ABCD1234 COPY", YEAR);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.code, "ABCD1234");
        assert_eq!(record.reward, "100 Gems");
        assert_eq!(record.date, "3rd October");
        assert_eq!(record.status, CouponStatus::Active);
        assert_eq!(record.server, "Global");
    }

    #[test]
    fn test_expired_code_excluded() {
        assert!(extract_codes("3rd October ABCD1234 Expired", YEAR).is_empty());
        assert!(extract_codes("Reward: 50 Gems 3rd October ABCD1234 Expired", YEAR).is_empty());
    }

    #[test]
    fn test_page_words_never_emitted() {
        let text = "FC MOBILE REDEEM CODES Reward: REWARD PACK 5th October COPY \
                    OCTOBER EXPIRED REWARDS HOME MENU 4th October XMAS2025GIFT COPY";
        let records = extract_codes(text, YEAR);

        for word in ["REWARD", "COPY", "EXPIRED", "OCTOBER", "REWARDS", "MOBILE"] {
            assert!(records.iter().all(|r| r.code != word), "emitted {word}");
        }
        assert!(records.iter().all(|r| CodeRules::FC_MOBILE.is_valid(&r.code)));
    }

    #[test]
    fn test_multiple_copy_blocks_keep_their_rewards() {
        let text = "Reward: 100 Gems 3rd October AAAA1111 COPY \
                    Reward: 2 Rank Up Tickets 5th October BBBB2222 COPY";
        let records = extract_codes(text, YEAR);

        assert_eq!(codes(&records), vec!["BBBB2222", "AAAA1111"]);
        assert_eq!(records[0].reward, "2 Rank Up Tickets");
        assert_eq!(records[1].reward, "100 Gems");
    }

    #[test]
    fn test_reward_spanning_expired_block_is_trimmed() {
        let text = "Reward: Old Pack 1st October OLDC0DE1 Expired \
                    Reward: 300 Gems 2nd October NEWC0DE2 COPY";
        let records = extract_codes(text, YEAR);

        assert_eq!(codes(&records), vec!["NEWC0DE2"]);
        assert_eq!(records[0].reward, "300 Gems");
    }

    #[test]
    fn test_unlabelled_block_after_expired_one() {
        let text = "Reward: 100 Gems 3rd October ABCD1234 Expired 4th October EFGH5678 COPY";
        let records = extract_codes(text, YEAR);

        assert_eq!(codes(&records), vec!["EFGH5678"]);
        assert_eq!(records[0].reward, UNKNOWN_REWARD);
        assert_eq!(records[0].date, "4th October");
    }

    #[test]
    fn test_inline_markup_in_page() {
        let source = FcMobileSource::new(None, Arc::new(BrokenBrowser { calls: AtomicUsize::new(0) }));
        let html = "<html><body><p>Reward: 100 Gems 3<sup>rd</sup> October \
                    <span>ABCD</span>1234 COPY</p></body></html>";
        let records = source.parse(html);

        assert_eq!(codes(&records), vec!["ABCD1234"]);
        assert_eq!(records[0].reward, "100 Gems");
        assert_eq!(records[0].date, "3rd October");
    }

    #[test]
    fn test_section_scan_without_copy_button() {
        let text = "Latest codes 12th September Reward: 500 Points GIFT4YOU";
        let records = extract_codes(text, YEAR);

        assert_eq!(codes(&records), vec!["GIFT4YOU"]);
        assert_eq!(records[0].date, "12th September");
        assert_eq!(records[0].reward, "500 Points");
    }

    #[test]
    fn test_section_reward_keyword_fallback() {
        assert_eq!(
            section_reward("1st May 150 Gems plus a Pack BONUS999", "BONUS999"),
            "150 Gems Pack"
        );
        assert_eq!(section_reward("1st May BONUS999", "BONUS999"), UNKNOWN_REWARD);
    }

    #[test]
    fn test_section_reward_length_limit() {
        let short = "a".repeat(MAX_SECTION_REWARD_CHARS - 1);
        let section = format!("1st May Reward: {short} BONUS999");
        assert_eq!(section_reward(&section, "BONUS999"), short);

        let long = "a".repeat(MAX_SECTION_REWARD_CHARS);
        let section = format!("1st May Reward: {long} BONUS999");
        assert_eq!(section_reward(&section, "BONUS999"), UNKNOWN_REWARD);
    }

    #[test]
    fn test_reward_block_scan() {
        let text = "Reward: Icon Player 8th August claim it with ICON8AUG before it ends";
        let records = reward_block_codes(text);

        assert_eq!(codes(&records), vec!["ICON8AUG"]);
        assert_eq!(records[0].reward, "Icon Player");
        assert_eq!(records[0].date, "8th August");
    }

    #[test]
    fn test_split_sections() {
        let sections = split_sections("intro 3rd October AAA 4 Oct BBB");
        assert_eq!(sections, vec!["intro ", "3rd October AAA ", "4 Oct BBB"]);
    }

    #[test]
    fn test_non_month_words_do_not_split() {
        let sections = split_sections("Top 10 players ABCD1234 and 5 gems");
        assert_eq!(sections.len(), 1);
    }

    #[test]
    fn test_sort_keeps_undated_in_place() {
        let mut records = vec![
            CouponRecord::active("AAAA1111", "", "1st May"),
            CouponRecord::active("BBBB2222", "", UNKNOWN_DATE),
            CouponRecord::active("CCCC3333", "", "3rd June"),
            CouponRecord::active("DDDD4444", "", "2nd May"),
        ];
        sort_newest_first(&mut records, YEAR);
        assert_eq!(codes(&records), vec!["CCCC3333", "BBBB2222", "DDDD4444", "AAAA1111"]);
    }

    struct StaticPage {
        html: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PageProvider for StaticPage {
        async fn fetch_page(&self, url: &str) -> std::result::Result<Page, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Page::new(url, self.html))
        }

        fn name(&self) -> &'static str {
            "fixture"
        }
    }

    struct BrokenBrowser {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PageProvider for BrokenBrowser {
        async fn fetch_page(&self, _url: &str) -> std::result::Result<Page, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(FetchError::Render("browser missing".to_string()))
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    const PAGE: &str = "<html><body><div>Reward: 100 Gems</div><div>3rd October</div>\
                        <span>ABCD1234</span> <button>COPY</button></body></html>";

    #[tokio::test(start_paused = true)]
    async fn test_falls_back_to_static_page() {
        let browser = Arc::new(BrokenBrowser { calls: AtomicUsize::new(0) });
        let fallback = Arc::new(StaticPage { html: PAGE, calls: AtomicUsize::new(0) });
        let source = FcMobileSource::new(Some(browser.clone() as Arc<dyn PageProvider>), fallback.clone());

        let records = source.active_coupons().await.unwrap();
        assert_eq!(codes(&records), vec!["ABCD1234"]);
        assert_eq!(browser.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rendered_page_used_when_it_has_codes() {
        let browser = Arc::new(StaticPage { html: PAGE, calls: AtomicUsize::new(0) });
        let fallback = Arc::new(StaticPage { html: "<p>empty</p>", calls: AtomicUsize::new(0) });
        let source = FcMobileSource::new(Some(browser as Arc<dyn PageProvider>), fallback.clone());

        let records = source.active_coupons().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_attempts_yield_empty_list() {
        let browser = Arc::new(BrokenBrowser { calls: AtomicUsize::new(0) });
        let fallback = Arc::new(StaticPage { html: "<p>No codes today</p>", calls: AtomicUsize::new(0) });
        let source = FcMobileSource::new(Some(browser.clone() as Arc<dyn PageProvider>), fallback.clone());

        let records = source.active_coupons().await.unwrap();
        assert!(records.is_empty());
        assert_eq!(browser.calls.load(Ordering::SeqCst), 2);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 2);
    }
}
