//! Process command - extract receipt rows from a single Tally export.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::{debug, info};

use vouchr_core::{Report, ReportFormat, VoucherExtractor};

use super::{build_extractor, load_config, write_output, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Tally XML export
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (default: from config, csv)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Write NA instead of leaving empty cells blank
    #[arg(long)]
    keep_na: bool,

    /// Omit the CSV header row
    #[arg(long)]
    no_header: bool,

    /// Voucher type to extract (default: from config, Receipt)
    #[arg(long)]
    voucher_type: Option<String>,

    /// Show voucher and reconciliation counts
    #[arg(long)]
    stats: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let data = fs::read(&args.input)?;
    let extractor = build_extractor(&config, args.voucher_type.as_deref());
    let records = extractor
        .extract_from_bytes(&data)
        .with_context(|| format!("Failed to process {}", args.input.display()))?;

    if records.is_empty() {
        let voucher_type = args
            .voucher_type
            .as_deref()
            .unwrap_or(&config.extraction.receipt_voucher_type);
        println!(
            "{} No '{}' vouchers found.",
            style("ℹ").blue(),
            voucher_type
        );
        return Ok(());
    }

    let format: ReportFormat = args
        .format
        .map(Into::into)
        .unwrap_or(config.report.default_format);

    let mut report = Report::from_config(&records, &config.report);
    if args.keep_na {
        report = report.with_blank_missing(false);
    }
    if args.no_header {
        report = report.with_header(false);
    }

    let output = report.render(format)?;

    if let Some(output_path) = &args.output {
        write_output(output_path, output.as_bytes())?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    if args.stats {
        let stats = report.stats();
        eprintln!(
            "{} {} vouchers, {} allocations",
            style("ℹ").blue(),
            stats.vouchers,
            stats.children
        );
        eprintln!(
            "{} {} verified, {} unverified",
            style("ℹ").blue(),
            style(stats.verified).green(),
            style(stats.unverified).red()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
