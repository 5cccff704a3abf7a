//! Recognizes which modeled endpoint a recorded URL belongs to.
//!
//! Patterns are anchored at the end of the URL and match on the `/ver1/...`
//! suffix only, so both absolute recordings
//! (`https://api.3commas.io/public/api/ver1/deals/1/show`) and bare paths work.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::errors::{MockError, MockResult};

static DEAL_SHOW_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/ver1/deals/(\d+)/show$").expect("valid deal show pattern"));
static DEALS_LIST_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/ver1/deals(\?.*)?$").expect("valid deals list pattern"));
static BOTS_LIST_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/ver1/bots(\?.*)?$").expect("valid bots list pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    DealShow(i64),
    DealsList,
    BotsList,
}

/// Classify a URL, checking the single-deal shape first.
///
/// Returns `None` for endpoints the mock does not model.
pub fn classify(url: &str) -> Option<Endpoint> {
    if let Ok(id) = extract_deal_id(url) {
        return Some(Endpoint::DealShow(id));
    }
    if DEALS_LIST_PATTERN.is_match(url) {
        return Some(Endpoint::DealsList);
    }
    if BOTS_LIST_PATTERN.is_match(url) {
        return Some(Endpoint::BotsList);
    }
    None
}

/// Deal ID from a `.../deals/{id}/show` URL
pub fn extract_deal_id(url: &str) -> MockResult<i64> {
    DEAL_SHOW_PATTERN
        .captures(url)
        .and_then(|captures| captures.get(1))
        .and_then(|id| id.as_str().parse().ok())
        .ok_or_else(|| MockError::PatternMismatch(url.to_string()))
}
