//! Field rules for Tally voucher exports.

pub mod amounts;
pub mod dates;
pub mod patterns;

pub use amounts::parse_amount;
pub use dates::{format_voucher_date, parse_tally_date};
