//! Process command - extract records from a single invoice file.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use super::output::{format_report, print_validation, write_report, OutputFormat};
use super::{load_pipeline, parse_file};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, or text with form-feed page breaks)
    #[arg(required = true)]
    input: PathBuf,

    /// Output directory (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Treat a document without records as an error
    #[arg(long)]
    strict: bool,

    /// Show parse warnings and line statistics
    #[arg(long)]
    show_stats: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let pipeline = load_pipeline(config_path)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Extracting statement...");
    pb.set_position(10);
    let document = parse_file(&args.input, &pipeline)?;

    pb.finish_and_clear();

    let document = if args.strict {
        document.require_records()?
    } else {
        document
    };

    if document.is_empty() {
        warn!("No records extracted from {}", args.input.display());
        eprintln!("{} No invoice data extracted.", style("!").yellow());
        return Ok(());
    }

    if args.show_stats {
        let stats = &document.stats;
        eprintln!(
            "{} {} pages, {} lines: {} bookings, {} annotations, {} context, {} noise, {} discarded",
            style("ℹ").blue(),
            stats.pages,
            stats.lines,
            stats.bookings,
            stats.annotations,
            stats.context,
            stats.noise,
            stats.unclassified
        );
        for warning in &document.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let report = pipeline.report(document);
    print_validation(&report);

    if let Some(dir) = &args.output {
        for path in write_report(&report, args.format, dir)? {
            println!("{} Output written to {}", style("✓").green(), path.display());
        }
        if matches!(args.format, OutputFormat::Csv) {
            println!(
                "{} Workbook {} is written as one CSV file per sheet",
                style("ℹ").blue(),
                report.filename
            );
        }
    } else {
        println!("{}", format_report(&report, args.format)?);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
