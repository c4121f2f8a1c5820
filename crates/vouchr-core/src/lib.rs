//! Core library for Tally voucher extraction.
//!
//! This crate provides:
//! - An in-memory XML document model for Tally exports (UTF-8 or UTF-16)
//! - Expansion of receipt vouchers into Parent, Other and Child rows
//! - Reconciliation of bill allocations against voucher amounts
//! - CSV, JSON and text rendering of the resulting rows

pub mod error;
pub mod models;
pub mod report;
pub mod voucher;
pub mod xml;

pub use error::{ExtractionError, ReportError, Result, VouchrError, XmlError};
pub use models::config::{ReportFormat, VouchrConfig};
pub use models::record::{AmountVerified, Slot, TransactionType, VoucherRecord, COLUMNS, NA};
pub use report::{Report, ReportRow, ReportStats};
pub use voucher::{TallyExtractor, VoucherExtractor};
pub use xml::{Document, Element};
