//! Batch processing command for multiple invoice files.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, warn};

use wastebill_core::{Pipeline, ReconciliationSummary, Report};

use super::output::{write_report, OutputFormat};
use super::{is_supported, load_pipeline, parse_file};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    report: Option<Report>,
    error: Option<String>,
    processing_time_ms: u64,
}

impl ProcessResult {
    fn status(&self) -> &'static str {
        match (&self.report, &self.error) {
            (_, Some(_)) => "error",
            (Some(report), None) if report.records.is_empty() => "empty",
            _ => "success",
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let pipeline = Arc::new(load_pipeline(config_path)?);

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_supported(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // Documents are independent: each gets its own parse on a blocking worker
    let permits = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, path) in files.into_iter().enumerate() {
        let pipeline = pipeline.clone();
        let permits = permits.clone();

        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await;
            let task_path = path.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                let file_start = Instant::now();
                let result = process_single_file(&task_path, &pipeline);
                (result, file_start.elapsed().as_millis() as u64)
            })
            .await;
            (index, path, outcome)
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (index, path, outcome) = joined?;
        // A worker that died is reported like any other per-file failure
        let (result, processing_time_ms) = match outcome {
            Ok(done) => done,
            Err(e) => (Err(anyhow::anyhow!("worker failed: {}", e)), 0),
        };

        match result {
            Ok(report) => {
                results.push((
                    index,
                    ProcessResult {
                        path,
                        report: Some(report),
                        error: None,
                        processing_time_ms,
                    },
                ));
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push((
                        index,
                        ProcessResult {
                            path,
                            report: None,
                            error: Some(error_msg),
                            processing_time_ms,
                        },
                    ));
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    tasks.abort_all();
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    results.sort_by_key(|(index, _)| *index);
    let results: Vec<ProcessResult> = results.into_iter().map(|(_, r)| r).collect();

    // Write outputs
    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let Some(report) = result.report.as_ref().filter(|r| !r.records.is_empty()) {
                let dir = output_dir.join(file_stem(&result.path));
                write_report(report, args.format, &dir)?;
            }
        }
        if matches!(args.format, OutputFormat::Csv) {
            println!(
                "{} Workbooks are written as one CSV file per sheet",
                style("ℹ").blue()
            );
        }
    }

    // Generate summary if requested
    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        if let Some(parent) = summary_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let successful = results.iter().filter(|r| r.status() == "success").count();
    let empty: Vec<_> = results.iter().filter(|r| r.status() == "empty").collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} empty, {} failed",
        style(successful).green(),
        style(empty.len()).yellow(),
        style(failed.len()).red()
    );

    for result in &empty {
        println!("  - {}: no invoice data extracted", result.path.display());
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice")
        .to_string()
}

fn process_single_file(path: &Path, pipeline: &Pipeline) -> anyhow::Result<Report> {
    let document = parse_file(path, pipeline)?;
    Ok(pipeline.report(document))
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "report",
        "records",
        "invoices",
        "matched",
        "mismatched",
        "missing_declared_total",
        "overflowed",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(report) = &result.report {
            let summary = ReconciliationSummary::from_verdicts(&report.validation);
            wtr.write_record([
                filename,
                result.status(),
                &report.filename,
                &report.records.len().to_string(),
                &summary.invoices().to_string(),
                &summary.matched.to_string(),
                &summary.mismatched.to_string(),
                &summary.missing_declared_total.to_string(),
                &summary.overflowed.to_string(),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                result.status(),
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
