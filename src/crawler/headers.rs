//! Request headers for upstream page fetches

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

/// Build browser-like headers for wiki page requests
///
/// No cookies and no referer are sent; fandom pages render fully for an
/// anonymous desktop browser.
///
/// # Examples
///
/// ```
/// use coupon_scraper::crawler::headers::build_page_headers;
///
/// let headers = build_page_headers("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36");
/// assert!(headers.contains_key("user-agent"));
/// ```
pub fn build_page_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Ok(value) = HeaderValue::from_str(user_agent) {
        headers.insert(USER_AGENT, value);
    }
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    headers
}
