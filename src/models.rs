// Core data structures for the coupon scraper

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Placeholder used when no reward text could be extracted
pub const UNKNOWN_REWARD: &str = "Unknown reward";

/// Placeholder used when no date could be extracted
pub const UNKNOWN_DATE: &str = "Unknown";

/// Region printed when the source does not name one
pub const DEFAULT_SERVER: &str = "Global";

/// Redemption state derived from the textual cues next to a code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CouponStatus {
    #[serde(rename = "Active")]
    Active,
    #[serde(rename = "Active (Indefinite)")]
    ActiveIndefinite,
    #[serde(rename = "Expired")]
    Expired,
}

impl CouponStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::ActiveIndefinite => "Active (Indefinite)",
            Self::Expired => "Expired",
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Expired)
    }

    /// Classify a free-form status cell
    ///
    /// "expired", "invalid" and "hit max usage" win over "indefinite".
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();

        if lower.contains("expired") || lower.contains("invalid") || lower.contains("hit max usage")
        {
            Self::Expired
        } else if lower.contains("indefinite") {
            Self::ActiveIndefinite
        } else {
            Self::Active
        }
    }
}

impl fmt::Display for CouponStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single redeemable code as published by one upstream page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponRecord {
    pub code: String,
    pub reward: String,
    pub date: String,
    pub status: CouponStatus,
    pub server: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl CouponRecord {
    /// Build a record, substituting placeholders for blank fields
    pub fn new(
        code: impl Into<String>,
        reward: impl Into<String>,
        date: impl Into<String>,
        status: CouponStatus,
        server: impl Into<String>,
    ) -> Self {
        let reward = reward.into();
        let date = date.into();
        let server = server.into();

        Self {
            code: code.into(),
            reward: if reward.trim().is_empty() {
                UNKNOWN_REWARD.to_string()
            } else {
                reward
            },
            date: if date.trim().is_empty() {
                UNKNOWN_DATE.to_string()
            } else {
                date
            },
            status,
            server: if server.trim().is_empty() {
                DEFAULT_SERVER.to_string()
            } else {
                server
            },
            raw: None,
        }
    }

    /// Active, global record; the shape most sources produce
    pub fn active(code: impl Into<String>, reward: impl Into<String>, date: impl Into<String>) -> Self {
        Self::new(code, reward, date, CouponStatus::Active, DEFAULT_SERVER)
    }

    /// Attach the unparsed source fragment
    #[must_use]
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }
}

impl fmt::Display for CouponRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {} | {}",
            self.code, self.reward, self.date, self.status, self.server
        )
    }
}

/// Drop records whose code was already seen, keeping the first occurrence
pub fn dedup_by_code(records: Vec<CouponRecord>) -> Vec<CouponRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.code.clone()))
        .collect()
}
