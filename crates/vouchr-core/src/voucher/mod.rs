//! Receipt voucher extraction module.

mod extractor;
mod reconcile;
pub mod rules;

pub use extractor::TallyExtractor;
pub use reconcile::{allocation_totals, reconcile};

use crate::error::ExtractionError;
use crate::models::record::VoucherRecord;
use crate::xml::Document;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for voucher extractors.
pub trait VoucherExtractor {
    /// Extract report rows from a parsed export.
    fn extract(&self, document: &Document) -> Result<Vec<VoucherRecord>>;

    /// Parse raw export bytes and extract report rows.
    fn extract_from_bytes(&self, bytes: &[u8]) -> crate::Result<Vec<VoucherRecord>> {
        let document = Document::from_bytes(bytes)?;
        Ok(self.extract(&document)?)
    }
}
