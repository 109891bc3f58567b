//! Common test utilities

#![allow(dead_code)]

use async_trait::async_trait;
use coupon_scraper::crawler::{Page, PageProvider};
use coupon_scraper::error::{Error, Result};
use coupon_scraper::models::CouponRecord;
use coupon_scraper::sources::{CouponSource, SourceKind};
use coupon_scraper::utils::error::FetchError;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Genshin Impact page with one active, one indefinite and one expired code
pub const GENSHIN_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Promotional Code</title></head><body>
<table class="wikitable sortable"><tbody>
<tr><th>Code</th><th>Server</th><th>Rewards</th><th>Duration</th></tr>
<tr><td><b>EKLP57EFE4G4</b></td><td>America</td>
<td><span class="item-text">Primogem ×60</span><span class="item-text">Mora ×5,000</span></td>
<td>October 5, 2025</td></tr>
<tr><td><b>GENSHINGIFT</b></td><td>All</td>
<td><span class="item-text">Primogem ×50</span></td>
<td>Discovered: 3rd June 2025<br>Valid until: indefinite</td></tr>
<tr><td><b>OLDCODE01</b></td><td>Europe</td>
<td><span class="item-text">Hero's Wit ×3</span></td>
<td>October 1, 2024<br>Expired</td></tr>
</tbody></table>
</body></html>"#;

/// Honkai Star Rail page with a released/valid-until status column
pub const HONKAI_STAR_RAIL_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
<table class="wikitable"><tbody>
<tr><th>Code</th><th>Server</th><th>Rewards</th><th>Duration</th></tr>
<tr><td><code>HBKKDH9FR3NX</code></td><td></td>
<td><span class="item-text">Stellar Jade ×50</span></td>
<td>Released: September 3, 2025 Valid until: unknown</td></tr>
<tr><td><code>STARRAILGIFT</code></td><td>Global</td>
<td>Stellar Jade ×50, Credit ×10000</td>
<td>Released: April 26, 2023 Valid until: indefinite</td></tr>
<tr><td><code>HSRVER10JYTGHC</code></td><td>Global</td>
<td>Traveler's Guide ×5</td>
<td>Released: February 1, 2024 Hit max usage</td></tr>
</tbody></table>
</body></html>"#;

/// Blox Fruits page with working and expired tables
pub const BLOX_FRUITS_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
<table id="tpt-1" class="table-progress-tracking"><tbody>
<tr><th></th><th>Code</th><th>Reward</th><th>Release Date</th></tr>
<tr><td>☐</td><td><code>SUB2CAPTAINMAUI</code></td>
<td><span class="color-currency(Money)">$20000</span></td>
<td>September 3, 2025</td></tr>
<tr><td>☐</td><td><code>KITT_RESET</code></td><td>Stat Refund</td><td>9/1/2025</td></tr>
</tbody></table>
<table id="tpt-2" class="table-progress-tracking"><tbody>
<tr><td>☐</td><td><code>EXPIRED2023</code></td><td>2x EXP</td><td>January 1, 2023</td></tr>
</tbody></table>
</body></html>"#;

/// Play Together page
pub const PLAY_TOGETHER_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
<table class="article-table"><tbody>
<tr><th>Coupon Code</th><th>Valid Until</th><th>Rewards</th></tr>
<tr><td>playwithus</td><td>Dec 31 2025</td><td>Star Candy x100<br>Gem x10</td></tr>
<tr><td>HAPPY 2025</td><td>Jan 15 2026</td><td>Gem x50<br/></td></tr>
</tbody></table>
</body></html>"#;

/// FC Mobile page as rendered by a browser
pub const FC_MOBILE_PAGE: &str = r#"<!DOCTYPE html>
<html><head><script>var CODES = ["SCRIPTONLY1"];</script></head><body>
<nav>HOME MENU REDEEM CODES</nav>
<section>
<div>Reward: 100 Gems</div><div>3rd October</div><span>ABCD1234</span> <button>COPY</button>
<div>Reward: 2 Rank Up Tickets</div><div>5th October</div><span>FCM5OCT2025</span> <button>COPY</button>
<div>Reward: 50 Gems</div><div>1st October</div><span>OLDFCM0110</span> <span>Expired</span>
</section>
</body></html>"#;

/// Page provider serving a fixed document and counting calls
pub struct FixtureProvider {
    html: String,
    calls: AtomicUsize,
}

impl FixtureProvider {
    pub fn new(html: &str) -> Self {
        Self {
            html: html.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageProvider for FixtureProvider {
    async fn fetch_page(&self, url: &str) -> std::result::Result<Page, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Page::new(url, self.html.clone()))
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}

/// Page provider that always fails the way a dead upstream does
pub struct UnreachableProvider;

#[async_trait]
impl PageProvider for UnreachableProvider {
    async fn fetch_page(&self, _url: &str) -> std::result::Result<Page, FetchError> {
        Err(FetchError::ServerError(503))
    }

    fn name(&self) -> &'static str {
        "unreachable"
    }
}

/// Adapter returning canned records
pub struct CannedSource {
    pub kind: SourceKind,
    pub records: Vec<CouponRecord>,
}

#[async_trait]
impl CouponSource for CannedSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn active_coupons(&self) -> Result<Vec<CouponRecord>> {
        Ok(self.records.clone())
    }
}

/// Adapter whose page handling fails outright
pub struct FailingSource(pub SourceKind);

#[async_trait]
impl CouponSource for FailingSource {
    fn kind(&self) -> SourceKind {
        self.0
    }

    async fn active_coupons(&self) -> Result<Vec<CouponRecord>> {
        Err(Error::other("selector engine unavailable"))
    }
}

/// Adapter that panics mid-request
pub struct PanickingSource(pub SourceKind);

#[async_trait]
impl CouponSource for PanickingSource {
    fn kind(&self) -> SourceKind {
        self.0
    }

    async fn active_coupons(&self) -> Result<Vec<CouponRecord>> {
        panic!("unexpected page layout")
    }
}
