//! Line normalization and amount parsing.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Unicode characters printed in place of an ASCII minus sign.
const MINUS_VARIANTS: [char; 4] = ['\u{2212}', '\u{2012}', '\u{FE63}', '\u{FF0D}'];

/// Trim a raw line and fold unicode minus signs to `-`.
pub fn normalize_line(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if MINUS_VARIANTS.contains(&c) { '-' } else { c })
        .collect()
}

/// Strip thousands separators (`1,234.50` -> `1234.50`).
pub fn strip_thousands(s: &str) -> String {
    s.replace(',', "")
}

/// Parse a statement amount such as `1,234.50` or `-12.00`.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    Decimal::from_str(&strip_thousands(s.trim())).ok()
}
