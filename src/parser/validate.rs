//! Code-shape validation
//!
//! Each source publishes codes with its own alphabet and length. A
//! [`CodeRules`] value captures one source's constraints, including the
//! blocklist of page words that look like codes but are not.

/// Characters a code may consist of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// `[A-Z0-9]+`
    UpperAlnum,
    /// `[A-Za-z0-9]+`
    MixedAlnum,
    /// Any text; cell contents are taken as printed
    Any,
}

impl Charset {
    pub fn matches(&self, code: &str) -> bool {
        match self {
            Self::UpperAlnum => code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()),
            Self::MixedAlnum => code.chars().all(|c| c.is_ascii_alphanumeric()),
            Self::Any => true,
        }
    }
}

/// Column headers that leak into table bodies
pub const HEADER_LITERALS: &[&str] = &["CODE", "Coupon Code", "CouponCode"];

/// Page words that match the FC Mobile code alphabet
pub const FC_MOBILE_BLOCKLIST: &[&str] = &[
    "REWARD", "REWARDS", "PACK", "PACKS", "GEMS", "COIN", "COINS", "PLAYER", "PLAYERS",
    "STANDARD", "ANNIVERSARY", "LIMITED", "ITEM", "ITEMS", "CARD", "CARDS", "ACTIVE",
    "EXPIRED", "CODE", "CODES", "REDEEM", "BUTTON", "HOME", "MORE", "CLOSE", "MOBILE",
    "TRUE", "FALSE", "LABEL", "PAGE", "SECTION", "NAVBAR", "MENU", "FOOTER", "HEADER",
    "COPY", "HERE", "OCTOBER", "SEPTEMBER", "AUGUST", "JANUARY", "MARCH", "MAY", "POINTS",
    "RANK", "ICONS", "FESTIVAL", "SHANGHAI", "TICKETS",
];

/// Prefixes of navigation labels glued to neighbouring tokens
pub const FC_MOBILE_BLOCKED_PREFIXES: &[&str] =
    &["COPY", "HERE", "MORE", "PAGE", "HOME", "MENU", "EXPIRED"];

/// Shape constraints for one source's codes
#[derive(Debug, Clone, Copy)]
pub struct CodeRules {
    pub min_len: usize,
    pub max_len: usize,
    pub charset: Charset,
    /// Minimum number of ASCII letters
    pub min_letters: usize,
    pub reject_all_digits: bool,
    /// Case-insensitive exact matches to reject
    pub blocklist: &'static [&'static str],
    /// Case-sensitive prefixes to reject
    pub blocked_prefixes: &'static [&'static str],
}

impl CodeRules {
    /// Genshin Impact and Honkai Star Rail
    pub const HOYOVERSE: CodeRules = CodeRules {
        min_len: 4,
        max_len: usize::MAX,
        charset: Charset::UpperAlnum,
        min_letters: 0,
        reject_all_digits: false,
        blocklist: &[],
        blocked_prefixes: &[],
    };

    pub const BLOX_FRUITS: CodeRules = CodeRules {
        min_len: 3,
        max_len: usize::MAX,
        charset: Charset::Any,
        min_letters: 0,
        reject_all_digits: false,
        blocklist: &[],
        blocked_prefixes: &[],
    };

    pub const PLAY_TOGETHER: CodeRules = CodeRules {
        min_len: 3,
        max_len: usize::MAX,
        charset: Charset::MixedAlnum,
        min_letters: 0,
        reject_all_digits: false,
        blocklist: &[],
        blocked_prefixes: &[],
    };

    pub const FC_MOBILE: CodeRules = CodeRules {
        min_len: 6,
        max_len: 20,
        charset: Charset::UpperAlnum,
        min_letters: 2,
        reject_all_digits: true,
        blocklist: FC_MOBILE_BLOCKLIST,
        blocked_prefixes: FC_MOBILE_BLOCKED_PREFIXES,
    };

    /// Check a candidate against every rule
    ///
    /// # Examples
    ///
    /// ```
    /// use coupon_scraper::parser::validate::CodeRules;
    ///
    /// assert!(CodeRules::HOYOVERSE.is_valid("EKLP57EFE4G4"));
    /// assert!(!CodeRules::HOYOVERSE.is_valid("CODE"));
    /// assert!(!CodeRules::FC_MOBILE.is_valid("OCTOBER"));
    /// ```
    pub fn is_valid(&self, code: &str) -> bool {
        let code = code.trim();
        if code.is_empty() {
            return false;
        }

        let len = code.chars().count();
        if len < self.min_len || len > self.max_len {
            return false;
        }

        if !self.charset.matches(code) {
            return false;
        }

        if HEADER_LITERALS.iter().any(|h| h.eq_ignore_ascii_case(code)) {
            return false;
        }

        if self.blocklist.iter().any(|b| b.eq_ignore_ascii_case(code)) {
            return false;
        }

        if self.reject_all_digits && code.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }

        if code.chars().filter(char::is_ascii_alphabetic).count() < self.min_letters {
            return false;
        }

        !self.blocked_prefixes.iter().any(|p| code.starts_with(p))
    }
}
