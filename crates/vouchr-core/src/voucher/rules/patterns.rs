//! Regex patterns for Tally field values.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Tally voucher date: YYYYMMDD with no separators
    pub static ref TALLY_DATE: Regex = Regex::new(
        r"^(\d{4})(\d{2})(\d{2})$"
    ).unwrap();

    // Tally amount: optional sign, digits, optional fraction
    pub static ref TALLY_AMOUNT: Regex = Regex::new(
        r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)$"
    ).unwrap();
}
