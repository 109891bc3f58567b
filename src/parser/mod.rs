//! HTML parsing and normalisation shared by every source adapter
//!
//! - [`date`] - date normalisation with ordinal days
//! - [`sanitize`] - reward text cleanup
//! - [`validate`] - per-source code shape rules
//! - [`dom`] - text projections over `scraper` documents
//! - [`selectors`] - precompiled CSS selectors

pub mod date;
pub mod dom;
pub mod sanitize;
pub mod selectors;
pub mod validate;

pub use date::{format_day_month, normalize_date, ordinal_suffix, parse_day_month};
pub use dom::{document_text, element_text, row_cells};
pub use sanitize::{clean_reward, html_fragment_to_list};
pub use validate::{Charset, CodeRules};
