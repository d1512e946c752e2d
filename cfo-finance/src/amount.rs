//! Money amount extraction from OCR text.

use regex::Regex;
use std::sync::LazyLock;

static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d{2}").expect("amount regex is valid"));

/// Return the first `digits.dd` amount in `text`, or 0.0 when there is none.
///
/// Exactly two fractional digits are required, so "5.5" is skipped. No currency
/// symbols, thousands separators or negative amounts are recognised.
pub fn extract_amount(text: &str) -> f64 {
    AMOUNT_RE
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}
