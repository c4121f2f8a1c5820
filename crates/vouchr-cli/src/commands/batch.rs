//! Batch processing command for multiple Tally exports.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use vouchr_core::models::config::ReportConfig;
use vouchr_core::{Report, ReportFormat, ReportStats, TallyExtractor, VoucherExtractor};

use super::{build_extractor, extension, load_config, write_output, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file (default: from config, csv)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Write NA instead of leaving empty cells blank
    #[arg(long)]
    keep_na: bool,

    /// Voucher type to extract (default: from config, Receipt)
    #[arg(long)]
    voucher_type: Option<String>,
}

/// Settings shared by every worker.
struct BatchJob {
    extractor: TallyExtractor,
    report: ReportConfig,
    format: ReportFormat,
    output_dir: Option<PathBuf>,
}

/// What happened to one input file.
enum FileOutcome {
    Written(ReportStats),
    Empty,
    Failed(String),
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    outcome: FileOutcome,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            ext.eq_ignore_ascii_case("xml")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    // Create output directory if specified
    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let mut report = config.report.clone();
    if args.keep_na {
        report.blank_missing = false;
    }

    let job = Arc::new(BatchJob {
        extractor: build_extractor(&config, args.voucher_type.as_deref()),
        report,
        format: args.format.map(Into::into).unwrap_or(config.report.default_format),
        output_dir: args.output_dir.clone(),
    });

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // Extraction is CPU-bound and independent per file; run it on the blocking pool.
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, path) in files.into_iter().enumerate() {
        let permit = semaphore.clone().acquire_owned().await?;
        let job = Arc::clone(&job);
        let pb = overall_pb.clone();

        tasks.spawn_blocking(move || {
            let _permit = permit;
            let file_start = Instant::now();
            let outcome = match process_single_file(&path, &job) {
                Ok(outcome) => outcome,
                Err(e) => FileOutcome::Failed(format!("{:#}", e)),
            };
            pb.inc(1);
            (
                index,
                ProcessResult {
                    path,
                    outcome,
                    processing_time_ms: file_start.elapsed().as_millis() as u64,
                },
            )
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined?;

        if let FileOutcome::Failed(error_msg) = &result.outcome {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                // Queued files are cancelled; files already running finish their writes.
                tasks.abort_all();
                while tasks.join_next().await.is_some() {}
                overall_pb.abandon();
                anyhow::bail!("Processing failed: {}", error_msg);
            }
        }

        results.push((index, result));
    }

    overall_pb.finish_with_message("Complete");

    results.sort_by_key(|(index, _)| *index);
    let results: Vec<ProcessResult> = results.into_iter().map(|(_, r)| r).collect();

    // Generate summary if requested
    if args.summary {
        let summary_path = args.output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let written = results.iter().filter(|r| matches!(r.outcome, FileOutcome::Written(_))).count();
    let empty = results.iter().filter(|r| matches!(r.outcome, FileOutcome::Empty)).count();
    let failed: Vec<_> = results
        .iter()
        .filter(|r| matches!(r.outcome, FileOutcome::Failed(_)))
        .collect();

    // Print summary
    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} with vouchers, {} without, {} failed",
        style(written).green(),
        style(empty).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            if let FileOutcome::Failed(error_msg) = &result.outcome {
                println!("  - {}: {}", result.path.display(), error_msg);
            }
        }
    }

    Ok(())
}

fn process_single_file(path: &Path, job: &BatchJob) -> anyhow::Result<FileOutcome> {
    let data = fs::read(path)?;
    let records = job.extractor.extract_from_bytes(&data)?;

    if records.is_empty() {
        debug!("No receipt vouchers in {}", path.display());
        return Ok(FileOutcome::Empty);
    }

    let report = Report::from_config(&records, &job.report);

    if let Some(output_dir) = &job.output_dir {
        let output_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("vouchers");
        let output_path = output_dir.join(format!("{}.{}", output_name, extension(job.format)));

        let content = report.render(job.format)?;
        write_output(&output_path, content.as_bytes())?;
    }

    Ok(FileOutcome::Written(report.stats()))
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "vouchers",
        "children",
        "verified",
        "unverified",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let time_ms = result.processing_time_ms.to_string();

        match &result.outcome {
            FileOutcome::Written(stats) => {
                wtr.write_record([
                    filename,
                    "success",
                    &stats.vouchers.to_string(),
                    &stats.children.to_string(),
                    &stats.verified.to_string(),
                    &stats.unverified.to_string(),
                    &time_ms,
                    "",
                ])?;
            }
            FileOutcome::Empty => {
                wtr.write_record([filename, "empty", "0", "0", "0", "0", &time_ms, ""])?;
            }
            FileOutcome::Failed(error_msg) => {
                wtr.write_record([filename, "error", "", "", "", "", &time_ms, error_msg])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
