//! Flattened voucher rows produced from a Tally export.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Literal used for empty cells when blanks are not requested.
pub const NA: &str = "NA";

/// Column headers, in report order.
pub const COLUMNS: [&str; 13] = [
    "Date",
    "VoucherType",
    "TransactionType",
    "VoucherNumber",
    "RefNo",
    "RefType",
    "RefDate",
    "Debtor",
    "RefAmount",
    "Amount",
    "Particulars",
    "VchType",
    "AmountVerified",
];

/// A cell value that remembers why it may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<T> {
    /// A value read from the export or derived from one.
    Value(T),
    /// The source element was absent (or had no text).
    Missing,
    /// Deliberately empty for this kind of row.
    Cleared,
}

impl<T> Slot<T> {
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Slot::Missing, Slot::Value)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Slot::Value(v) => Some(v),
            Slot::Missing | Slot::Cleared => None,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Slot::Value(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Slot<U> {
        match self {
            Slot::Value(v) => Slot::Value(f(v)),
            Slot::Missing => Slot::Missing,
            Slot::Cleared => Slot::Cleared,
        }
    }
}

impl<T: fmt::Display> Slot<T> {
    /// Render the cell, substituting `empty` for missing and cleared values.
    pub fn render(&self, empty: &str) -> String {
        match self {
            Slot::Value(v) => v.to_string(),
            Slot::Missing | Slot::Cleared => empty.to_string(),
        }
    }
}

/// Role of a row within its voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// The voucher's net total.
    Parent,
    /// Offsetting entry carrying the negated total.
    Other,
    /// One bill allocation against a reference.
    Child,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionType::Parent => "Parent",
            TransactionType::Other => "Other",
            TransactionType::Child => "Child",
        };
        f.write_str(s)
    }
}

/// Whether a voucher's allocations add up to its amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmountVerified {
    Yes,
    No,
}

impl From<bool> for AmountVerified {
    fn from(matches: bool) -> Self {
        if matches {
            AmountVerified::Yes
        } else {
            AmountVerified::No
        }
    }
}

impl fmt::Display for AmountVerified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountVerified::Yes => f.write_str("Yes"),
            AmountVerified::No => f.write_str("No"),
        }
    }
}

/// One row of the receipt report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherRecord {
    /// Voucher date, `DD-MM-YYYY` when the source was `YYYYMMDD`, raw text otherwise.
    pub date: Slot<String>,
    pub voucher_type: Slot<String>,
    pub transaction_type: TransactionType,
    pub voucher_number: Slot<String>,
    pub ref_no: Slot<String>,
    pub ref_type: Slot<String>,
    /// Allocation date, kept exactly as exported.
    pub ref_date: Slot<String>,
    pub debtor: Slot<String>,
    pub ref_amount: Slot<Decimal>,
    pub amount: Slot<Decimal>,
    pub particulars: Slot<String>,
    pub vch_type: Slot<String>,
    /// Only set on finalized Parent rows.
    pub amount_verified: Slot<AmountVerified>,
}

impl VoucherRecord {
    pub fn is_parent(&self) -> bool {
        self.transaction_type == TransactionType::Parent
    }

    pub fn is_child(&self) -> bool {
        self.transaction_type == TransactionType::Child
    }

    /// Voucher number used to group rows of one voucher.
    pub fn voucher_key(&self) -> Option<&str> {
        self.voucher_number.value().map(String::as_str)
    }

    /// Render every cell in column order.
    pub fn cells(&self, empty: &str) -> [String; 13] {
        [
            self.date.render(empty),
            self.voucher_type.render(empty),
            self.transaction_type.to_string(),
            self.voucher_number.render(empty),
            self.ref_no.render(empty),
            self.ref_type.render(empty),
            self.ref_date.render(empty),
            self.debtor.render(empty),
            self.ref_amount.render(empty),
            self.amount.render(empty),
            self.particulars.render(empty),
            self.vch_type.render(empty),
            self.amount_verified.render(empty),
        ]
    }
}
