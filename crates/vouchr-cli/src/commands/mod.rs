//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod process;

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use vouchr_core::{ReportFormat, TallyExtractor, VouchrConfig};

/// Output format selectable on the command line.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// CSV rows for spreadsheets
    Csv,
    /// JSON array of rows
    Json,
    /// Plain text voucher summary
    Text,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => ReportFormat::Csv,
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Text => ReportFormat::Text,
        }
    }
}

/// File extension for rendered output.
pub fn extension(format: ReportFormat) -> &'static str {
    match format {
        ReportFormat::Csv => "csv",
        ReportFormat::Json => "json",
        ReportFormat::Text => "txt",
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vouchr")
        .join("config.json")
}

/// Load the config given with `--config`, else the user config file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<VouchrConfig> {
    let config = match config_path {
        Some(path) => VouchrConfig::from_file(Path::new(path))?,
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                debug!("Using config from {}", default_path.display());
                VouchrConfig::from_file(&default_path)?
            } else {
                VouchrConfig::default()
            }
        }
    };

    config.validate()?;
    Ok(config)
}

/// Build an extractor from config, with an optional voucher type override.
pub fn build_extractor(config: &VouchrConfig, voucher_type: Option<&str>) -> TallyExtractor {
    let extractor = TallyExtractor::from_config(&config.extraction);
    match voucher_type {
        Some(voucher_type) => extractor.with_receipt_type(voucher_type),
        None => extractor,
    }
}

/// Write `content` to `path` through a temporary file in the same directory.
///
/// The temporary file is removed if anything fails before it is persisted.
pub fn write_output(path: &Path, content: &[u8]) -> anyhow::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path)?;

    debug!("Wrote output to {}", path.display());
    Ok(())
}
