//! Text sanitization utilities for reward cells
//!
//! Wiki reward cells mix plain text, leftover wikitext markup and icon
//! markup. These helpers turn them into short human strings.

use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

use crate::models::UNKNOWN_REWARD;
use crate::utils::normalize_whitespace;

static WIKI_LINK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]]+)\]\]").unwrap());

static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{[^}]*\}\}").unwrap());

static BR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

static COMMA_RUN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*,[\s,]*").unwrap());

/// Clean a reward string
///
/// 1. `[[Primogem]]` becomes `Primogem`, `{{Icon|...}}` is removed
/// 2. The multiplication sign becomes ` x`
/// 3. Whitespace runs collapse to one space
///
/// Empty results, and the bare column header "Reward", become
/// `"Unknown reward"`.
///
/// # Examples
///
/// ```
/// use coupon_scraper::parser::sanitize::clean_reward;
///
/// assert_eq!(clean_reward("Primogem ×60"), "Primogem x60");
/// assert_eq!(clean_reward("[[Mora]] ×10,000 {{Icon}}"), "Mora x10,000");
/// assert_eq!(clean_reward("Reward"), "Unknown reward");
/// ```
pub fn clean_reward(text: &str) -> String {
    let result = WIKI_LINK_REGEX.replace_all(text, "$1");
    let result = TEMPLATE_REGEX.replace_all(&result, "");
    let result = result.replace('×', " x");
    let result = normalize_whitespace(&result);

    if result.is_empty() || result.eq_ignore_ascii_case("reward") {
        UNKNOWN_REWARD.to_string()
    } else {
        result
    }
}

/// Strip markup from an HTML fragment, keeping only its text
pub fn strip_tags(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    let text: String = parsed.root_element().text().collect();
    normalize_whitespace(&text)
}

/// Turn a `<br>`-separated HTML cell into a comma separated list
///
/// # Examples
///
/// ```
/// use coupon_scraper::parser::sanitize::html_fragment_to_list;
///
/// assert_eq!(
///     html_fragment_to_list("Star Candy x100<br>Gem x10"),
///     "Star Candy x100, Gem x10"
/// );
/// ```
pub fn html_fragment_to_list(inner_html: &str) -> String {
    let with_commas = BR_REGEX.replace_all(inner_html, ", ");
    let text = strip_tags(&with_commas);
    let text = COMMA_RUN_REGEX.replace_all(&text, ", ");

    text.trim()
        .trim_matches(|c: char| c == ',' || c.is_whitespace())
        .to_string()
}
