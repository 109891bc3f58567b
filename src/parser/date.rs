//! Date normalisation for wiki date cells
//!
//! Upstream pages print dates in several shapes ("September 3, 2025",
//! "9/3/2025", "2025-09-03", "3rd September"). Everything that parses as a
//! real calendar date is rewritten to `"<day-ordinal> <Month>"` with the year
//! dropped; anything else is passed through trimmed.

use chrono::{Datelike, Month, NaiveDate};
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::models::UNKNOWN_DATE;

static MONTH_DAY_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+)\.?\s+(\d{1,2}),?\s+(\d{4})$").unwrap());

static SLASH_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap());

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap());

static ORDINAL_DAY_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})(?:st|nd|rd|th)\s+([A-Za-z]+)$").unwrap());

static ORDINAL_DAY_MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})(?:st|nd|rd|th)?\s+([A-Za-z]+)\.?,?\s+(\d{4})$").unwrap()
});

static DAY_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,2})(?:st|nd|rd|th)?\s+([A-Za-z]+)\.?$").unwrap()
});

/// English ordinal suffix for a day of the month
///
/// # Examples
///
/// ```
/// use coupon_scraper::parser::date::ordinal_suffix;
///
/// assert_eq!(ordinal_suffix(1), "st");
/// assert_eq!(ordinal_suffix(12), "th");
/// assert_eq!(ordinal_suffix(23), "rd");
/// ```
pub fn ordinal_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&day) {
        return "th";
    }

    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Render a date as `"3rd September"`
pub fn format_day_month(date: NaiveDate) -> String {
    let day = date.day();
    format!("{day}{} {}", ordinal_suffix(day), date.format("%B"))
}

/// Resolve a full or abbreviated English month name
pub fn month_from_name(name: &str) -> Option<Month> {
    let name = name.trim().trim_end_matches('.');
    if name.eq_ignore_ascii_case("sept") {
        return Some(Month::September);
    }
    Month::from_str(name).ok()
}

fn build_date(year: &str, month: u32, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month, day.parse().ok()?)
}

/// Normalise a free-form date string
///
/// Empty input, or input that is only a column header ("Release Date"),
/// becomes `"Unknown"`.
///
/// # Examples
///
/// ```
/// use coupon_scraper::parser::date::normalize_date;
///
/// assert_eq!(normalize_date("September 3, 2025"), "3rd September");
/// assert_eq!(normalize_date("2025-10-21"), "21st October");
/// assert_eq!(normalize_date("Release Date"), "Unknown");
/// assert_eq!(normalize_date("soon"), "soon");
/// ```
pub fn normalize_date(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.to_lowercase().contains("date") {
        return UNKNOWN_DATE.to_string();
    }

    if let Some(caps) = MONTH_DAY_YEAR.captures(trimmed) {
        if let Some(date) = month_from_name(&caps[1])
            .and_then(|m| build_date(&caps[3], m.number_from_month(), &caps[2]))
        {
            return format_day_month(date);
        }
    }

    if let Some(caps) = SLASH_DATE.captures(trimmed) {
        if let Some(date) = caps[1]
            .parse()
            .ok()
            .and_then(|month| build_date(&caps[3], month, &caps[2]))
        {
            return format_day_month(date);
        }
    }

    if let Some(caps) = ISO_DATE.captures(trimmed) {
        if let Some(date) = caps[2]
            .parse()
            .ok()
            .and_then(|month| build_date(&caps[1], month, &caps[3]))
        {
            return format_day_month(date);
        }
    }

    if ORDINAL_DAY_MONTH.is_match(trimmed) {
        return trimmed.to_string();
    }

    if let Some(caps) = ORDINAL_DAY_MONTH_YEAR.captures(trimmed) {
        if let Some(date) = month_from_name(&caps[2])
            .and_then(|m| build_date(&caps[3], m.number_from_month(), &caps[1]))
        {
            return format_day_month(date);
        }
    }

    trimmed.to_string()
}

/// Parse `"3rd October"` or `"3 Oct"` into a date within `year`
///
/// Returns `None` for anything that is not a real day of that year,
/// including the `"Unknown"` placeholder.
pub fn parse_day_month(text: &str, year: i32) -> Option<NaiveDate> {
    let caps = DAY_MONTH.captures(text.trim())?;
    let month = month_from_name(&caps[2])?;
    let day: u32 = caps[1].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month.number_from_month(), day)
}
