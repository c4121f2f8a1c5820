//! Error types for the vouchr-core library.

use thiserror::Error;

/// Main error type for the vouchr library.
#[derive(Error, Debug)]
pub enum VouchrError {
    /// XML parsing error.
    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    /// Voucher extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Report rendering error.
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to reading the XML export.
#[derive(Error, Debug)]
pub enum XmlError {
    /// The document is not well-formed.
    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    /// The document has no root element.
    #[error("document has no root element")]
    NoRoot,

    /// An element was still open when the input ended.
    #[error("element <{0}> is never closed")]
    Unclosed(String),

    /// The input bytes could not be decoded as text.
    #[error("invalid text encoding: {0}")]
    Encoding(String),
}

/// Errors raised while turning vouchers into rows.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A numeric field holds something that is not a decimal number.
    #[error("voucher {voucher}: {field} is not a number: {value:?}")]
    InvalidAmount {
        voucher: String,
        field: &'static str,
        value: String,
    },

    /// A voucher's allocation amounts add up beyond the decimal range.
    #[error("voucher {voucher}: allocation total overflows")]
    AllocationOverflow { voucher: String },
}

/// Errors related to rendering records.
#[derive(Error, Debug)]
pub enum ReportError {
    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing the rendered output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the vouchr library.
pub type Result<T> = std::result::Result<T, VouchrError>;
