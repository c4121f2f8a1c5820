//! Voucher date normalization.

use std::fmt::Write;

use chrono::NaiveDate;
use tracing::debug;

use super::patterns::TALLY_DATE;

/// Reformat a Tally `YYYYMMDD` date with `format`.
///
/// Anything that is not eight digits naming a real calendar date is returned
/// unchanged.
pub fn format_voucher_date(raw: &str, format: &str) -> String {
    match parse_tally_date(raw) {
        Some(date) => {
            let mut formatted = String::new();
            if write!(formatted, "{}", date.format(format)).is_ok() {
                formatted
            } else {
                debug!("Date format {:?} failed, keeping {:?}", format, raw);
                raw.to_string()
            }
        }
        None => {
            debug!("Keeping non-Tally date {:?} as is", raw);
            raw.to_string()
        }
    }
}

/// Parse a Tally `YYYYMMDD` date.
pub fn parse_tally_date(raw: &str) -> Option<NaiveDate> {
    let caps = TALLY_DATE.captures(raw)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Check that `format` can render a calendar date.
pub fn is_valid_format(format: &str) -> bool {
    let Some(sample) = NaiveDate::from_ymd_opt(2024, 1, 15) else {
        return false;
    };
    let mut out = String::new();
    write!(out, "{}", sample.format(format)).is_ok()
}
