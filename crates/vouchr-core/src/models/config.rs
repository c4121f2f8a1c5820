//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

use crate::error::VouchrError;
use crate::voucher::rules::dates::is_valid_format;

/// Main configuration for vouchr.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VouchrConfig {
    /// Voucher extraction configuration.
    pub extraction: ExtractionConfig,

    /// Report rendering configuration.
    pub report: ReportConfig,
}

/// Voucher extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// `VOUCHERTYPENAME` of vouchers that produce rows.
    pub receipt_voucher_type: String,

    /// chrono format used for `YYYYMMDD` voucher dates.
    pub date_output_format: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            receipt_voucher_type: "Receipt".to_string(),
            date_output_format: "%d-%m-%Y".to_string(),
        }
    }
}

/// Output format for rendered reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Comma-separated rows with a header line.
    #[default]
    Csv,
    /// JSON array of row objects.
    Json,
    /// Per-voucher plain text summary.
    Text,
}

/// Report rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Render missing and cleared cells as empty instead of `NA`.
    pub blank_missing: bool,

    /// Write the column header row in CSV output.
    pub include_header: bool,

    /// Format used when none is given on the command line.
    pub default_format: ReportFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            blank_missing: true,
            include_header: true,
            default_format: ReportFormat::Csv,
        }
    }
}

impl VouchrConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Reject settings the pipeline cannot honour.
    pub fn validate(&self) -> Result<(), VouchrError> {
        if self.extraction.receipt_voucher_type.trim().is_empty() {
            return Err(VouchrError::Config(
                "extraction.receipt_voucher_type must not be empty".to_string(),
            ));
        }
        if !is_valid_format(&self.extraction.date_output_format) {
            return Err(VouchrError::Config(format!(
                "extraction.date_output_format is not a valid date format: {:?}",
                self.extraction.date_output_format
            )));
        }
        Ok(())
    }
}
