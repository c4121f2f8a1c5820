//! Rendering of extracted rows for spreadsheet and human consumption.
//!
//! This is the only place where missing and cleared cells collapse into a
//! single empty representation (blank or the `NA` literal).

use std::collections::HashMap;
use std::io::Write;

use serde::Serialize;

use crate::error::ReportError;
use crate::models::config::{ReportConfig, ReportFormat};
use crate::models::record::{AmountVerified, VoucherRecord, COLUMNS, NA};

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// One rendered row, keyed by column name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "VoucherType")]
    pub voucher_type: String,
    #[serde(rename = "TransactionType")]
    pub transaction_type: String,
    #[serde(rename = "VoucherNumber")]
    pub voucher_number: String,
    #[serde(rename = "RefNo")]
    pub ref_no: String,
    #[serde(rename = "RefType")]
    pub ref_type: String,
    #[serde(rename = "RefDate")]
    pub ref_date: String,
    #[serde(rename = "Debtor")]
    pub debtor: String,
    #[serde(rename = "RefAmount")]
    pub ref_amount: String,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "Particulars")]
    pub particulars: String,
    #[serde(rename = "VchType")]
    pub vch_type: String,
    #[serde(rename = "AmountVerified")]
    pub amount_verified: String,
}

impl From<[String; 13]> for ReportRow {
    fn from(cells: [String; 13]) -> Self {
        let [
            date,
            voucher_type,
            transaction_type,
            voucher_number,
            ref_no,
            ref_type,
            ref_date,
            debtor,
            ref_amount,
            amount,
            particulars,
            vch_type,
            amount_verified,
        ] = cells;
        Self {
            date,
            voucher_type,
            transaction_type,
            voucher_number,
            ref_no,
            ref_type,
            ref_date,
            debtor,
            ref_amount,
            amount,
            particulars,
            vch_type,
            amount_verified,
        }
    }
}

/// Counts over a set of rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportStats {
    /// Receipt vouchers (Parent rows).
    pub vouchers: usize,
    /// Allocation rows.
    pub children: usize,
    /// Parents whose allocations match.
    pub verified: usize,
    /// Parents whose allocations do not match.
    pub unverified: usize,
}

impl ReportStats {
    pub fn from_records(records: &[VoucherRecord]) -> Self {
        let mut stats = Self::default();
        for record in records {
            if record.is_child() {
                stats.children += 1;
            } else if record.is_parent() {
                stats.vouchers += 1;
                match record.amount_verified.value() {
                    Some(AmountVerified::Yes) => stats.verified += 1,
                    Some(AmountVerified::No) => stats.unverified += 1,
                    None => {}
                }
            }
        }
        stats
    }
}

/// Renderer over a finalized row set.
pub struct Report<'a> {
    records: &'a [VoucherRecord],
    blank_missing: bool,
    include_header: bool,
}

impl<'a> Report<'a> {
    /// Create a report rendering empty cells as blanks, with a header row.
    pub fn new(records: &'a [VoucherRecord]) -> Self {
        Self {
            records,
            blank_missing: true,
            include_header: true,
        }
    }

    pub fn from_config(records: &'a [VoucherRecord], config: &ReportConfig) -> Self {
        Self::new(records)
            .with_blank_missing(config.blank_missing)
            .with_header(config.include_header)
    }

    /// Render empty cells as blanks (`true`) or as `NA` (`false`).
    pub fn with_blank_missing(mut self, blank: bool) -> Self {
        self.blank_missing = blank;
        self
    }

    /// Include the CSV header row.
    pub fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    fn empty_cell(&self) -> &'static str {
        if self.blank_missing { "" } else { NA }
    }

    /// Rendered rows in extraction order.
    pub fn rows(&self) -> Vec<ReportRow> {
        self.records
            .iter()
            .map(|r| ReportRow::from(r.cells(self.empty_cell())))
            .collect()
    }

    pub fn stats(&self) -> ReportStats {
        ReportStats::from_records(self.records)
    }

    /// Write CSV to any writer.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        if self.include_header {
            wtr.write_record(COLUMNS)?;
        }
        for record in self.records {
            wtr.write_record(record.cells(self.empty_cell()))?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Render as a JSON array of row objects.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.rows())?)
    }

    /// Render a per-voucher summary.
    pub fn summary_text(&self) -> String {
        let mut children: HashMap<Option<&str>, usize> = HashMap::new();
        for record in self.records.iter().filter(|r| r.is_child()) {
            *children.entry(record.voucher_key()).or_default() += 1;
        }

        let empty = "-";
        let mut output = String::new();
        for parent in self.records.iter().filter(|r| r.is_parent()) {
            output.push_str(&format!(
                "{}  {}  {}\n",
                parent.voucher_number.render(empty),
                parent.date.render(empty),
                parent.debtor.render(empty),
            ));
            output.push_str(&format!("  Amount:      {}\n", parent.amount.render(empty)));
            output.push_str(&format!(
                "  Allocations: {}\n",
                children.get(&parent.voucher_key()).copied().unwrap_or(0)
            ));
            output.push_str(&format!(
                "  Verified:    {}\n",
                parent.amount_verified.render(empty)
            ));
        }

        let stats = self.stats();
        output.push_str(&format!(
            "\n{} vouchers, {} allocations, {} verified, {} unverified\n",
            stats.vouchers, stats.children, stats.verified, stats.unverified
        ));
        output
    }

    /// Render in the given format.
    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Csv => {
                let mut buf = Vec::new();
                self.write_csv(&mut buf)?;
                Ok(String::from_utf8_lossy(&buf).into_owned())
            }
            ReportFormat::Json => self.to_json(),
            ReportFormat::Text => Ok(self.summary_text()),
        }
    }
}
