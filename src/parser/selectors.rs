//! CSS selectors for the supported wiki layouts
//!
//! Selectors are compiled once and shared by every request.

use lazy_static::lazy_static;
use scraper::Selector;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    // Shared table structure
    pub static ref TABLE_ROWS: Selector = parse_selector!("tbody tr");
    pub static ref LINKS: Selector = parse_selector!("a");

    // Fandom wikitables used by the HoYoverse pages
    pub static ref SORTABLE_WIKITABLE: Selector = parse_selector!("table.wikitable.sortable");
    pub static ref WIKITABLE: Selector = parse_selector!("table.wikitable");
    pub static ref INLINE_CODE: Selector = parse_selector!("b, code");
    pub static ref ITEM_TEXT: Selector = parse_selector!(".item-text");

    // Blox Fruits progress-tracking tables
    pub static ref WORKING_CODES_TABLE: Selector = parse_selector!("table#tpt-1");
    pub static ref PROGRESS_TABLE: Selector = parse_selector!("table.table-progress-tracking");
    pub static ref CODE_TAG: Selector = parse_selector!("code");
    pub static ref MONEY_SPAN: Selector = parse_selector!("span[class~=\"color-currency(Money)\"]");

    // Play Together article tables
    pub static ref ARTICLE_TABLE: Selector = parse_selector!("table.article-table");
}

/// Selectors describing where a HoYoverse wiki keeps its code tables
#[derive(Clone, Copy)]
pub struct WikiTableSelectors {
    pub table: &'static Selector,
    pub rows: &'static Selector,
    pub code: &'static Selector,
    pub links: &'static Selector,
    pub reward_items: &'static Selector,
}

impl WikiTableSelectors {
    /// Genshin Impact marks its code tables as sortable
    pub fn sortable() -> Self {
        Self {
            table: &SORTABLE_WIKITABLE,
            ..Self::any()
        }
    }

    /// Every wikitable on the page
    pub fn any() -> Self {
        Self {
            table: &WIKITABLE,
            rows: &TABLE_ROWS,
            code: &INLINE_CODE,
            links: &LINKS,
            reward_items: &ITEM_TEXT,
        }
    }
}
