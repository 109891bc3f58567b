//! Integration tests for StaticFetcher using wiremock
//!
//! These tests validate the HTTP fetcher and the table adapters against a
//! mock upstream.

mod common;

use common::GENSHIN_PAGE;
use coupon_scraper::crawler::{PageProvider, StaticFetcher};
use coupon_scraper::sources::{CouponSource, HoyoWikiSource, PlayTogetherSource};
use coupon_scraper::utils::error::FetchError;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Test successful fetch from mock server
#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/Promotional_Code"))
        .and(header("user-agent", DESKTOP_UA))
        .respond_with(ResponseTemplate::new(200).set_body_string(GENSHIN_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = StaticFetcher::new().unwrap();
    let url = format!("{}/wiki/Promotional_Code", mock_server.uri());
    let page = fetcher.fetch_page(&url).await.unwrap();

    assert_eq!(page.url, url);
    assert!(page.html.contains("EKLP57EFE4G4"));
}

/// Test that no referer or cookie is sent
#[tokio::test]
async fn test_no_referer_or_cookie() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header_exists("referer"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(header_exists("cookie"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "session=abc")
                .set_body_string("ok"),
        )
        .mount(&mock_server)
        .await;

    let fetcher = StaticFetcher::new().unwrap();
    let url = format!("{}/page", mock_server.uri());

    assert_eq!(fetcher.fetch(&url).await.unwrap(), "ok");
    // A cookie jar would replay the session cookie here
    assert_eq!(fetcher.fetch(&url).await.unwrap(), "ok");
}

/// Test non-2xx status codes surface as ServerError
#[tokio::test]
async fn test_status_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = StaticFetcher::new().unwrap();
    let result = fetcher.fetch(&format!("{}/missing", mock_server.uri())).await;

    match result {
        Err(FetchError::ServerError(status)) => assert_eq!(status, 404),
        other => panic!("Expected ServerError(404), got {other:?}"),
    }
}

/// Test slow upstream surfaces as Timeout
#[tokio::test]
async fn test_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let fetcher = StaticFetcher::with_config(DESKTOP_UA, Duration::from_millis(200)).unwrap();
    let result = fetcher.fetch(&format!("{}/slow", mock_server.uri())).await;

    assert!(matches!(result, Err(FetchError::Timeout)), "got {result:?}");
}

/// Test declared charset is honoured
#[tokio::test]
async fn test_declared_charset() {
    let mock_server = MockServer::start().await;

    // "Primogem ×60" in windows-1252
    let mut body = b"Primogem ".to_vec();
    body.push(0xD7);
    body.extend_from_slice(b"60");

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=windows-1252")
                .set_body_bytes(body),
        )
        .mount(&mock_server)
        .await;

    let fetcher = StaticFetcher::new().unwrap();
    let text = fetcher.fetch(&mock_server.uri()).await.unwrap();

    assert_eq!(text, "Primogem ×60");
}

/// Test adapters read through the static fetcher
#[tokio::test]
async fn test_adapter_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/Promotional_Code"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GENSHIN_PAGE))
        .mount(&mock_server)
        .await;

    let fetcher = Arc::new(StaticFetcher::new().unwrap());
    let source = HoyoWikiSource::genshin(fetcher)
        .with_url(format!("{}/wiki/Promotional_Code", mock_server.uri()));

    let records = source.active_coupons().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].code, "EKLP57EFE4G4");
}

/// Test an upstream error becomes an empty list
#[tokio::test]
async fn test_adapter_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = Arc::new(StaticFetcher::new().unwrap());
    let source = PlayTogetherSource::new(fetcher)
        .with_url(format!("{}/wiki/Coupon_Code", mock_server.uri()));

    let records = source.active_coupons().await.unwrap();
    assert!(records.is_empty());
}
