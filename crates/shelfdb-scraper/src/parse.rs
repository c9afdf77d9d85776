//! Price-string parsing for scraped listings.
//!
//! Storefronts render prices for humans: `"¥1,280"`, `"$12.99"`, `"1280円（税込）"`,
//! full-width `"１，２８０円"`. [`parse_price`] extracts the first amount.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("valid amount regex"));

/// Parses the first monetary amount in `text`.
///
/// Currency symbols, suffixes and thousands separators are ignored. Returns
/// `None` when `text` contains no digits.
#[must_use]
pub fn parse_price(text: &str) -> Option<Decimal> {
    let ascii = to_ascii_digits(text);
    let amount = AMOUNT_RE.find(&ascii)?;
    let digits: String = amount.as_str().chars().filter(|c| *c != ',').collect();
    Decimal::from_str(&digits).ok()
}

/// Maps full-width digits and separators to their ASCII forms.
fn to_ascii_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '０'..='９' => char::from_u32(u32::from(c) - u32::from('０') + u32::from('0'))
                .unwrap_or(c),
            '，' => ',',
            '．' => '.',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
