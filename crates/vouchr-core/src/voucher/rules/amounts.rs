//! Amount parsing for Tally exports.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::TALLY_AMOUNT;

/// Parse a Tally amount such as `-1000.00` into an exact decimal.
///
/// Returns `None` for anything that is not a plain signed decimal number.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if !TALLY_AMOUNT.is_match(trimmed) {
        return None;
    }

    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits = digits.strip_suffix('.').unwrap_or(digits);
    let digits = if digits.starts_with('.') {
        format!("0{}", digits)
    } else {
        digits.to_string()
    };

    let value = Decimal::from_str(&digits).ok()?;
    Some(if negative { -value } else { value })
}
