//! Report writers: CSV sheets, JSON and a plain text summary.

use std::fs;
use std::path::{Path, PathBuf};

use console::style;
use tracing::debug;

use wastebill_core::export::Sheet;
use wastebill_core::{MatchStatus, ReconciliationSummary, Report};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// One CSV file per sheet
    Csv,
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

/// Render a sheet as CSV.
pub fn sheet_to_csv(sheet: &Sheet) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(&sheet.headers)?;
    for row in &sheet.rows {
        wtr.write_record(row)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

/// Render a report as text in the given format. CSV output concatenates
/// both sheets, each preceded by a `# <sheet name>` line.
pub fn format_report(report: &Report, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Csv => {
            let mut output = String::new();
            for sheet in report.sheets() {
                output.push_str(&format!("# {}\n", sheet.name));
                output.push_str(&sheet_to_csv(&sheet)?);
            }
            Ok(output)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Text => Ok(format_text(report)),
    }
}

/// Write a report into `dir`, named after the report's stem. Returns the
/// files written.
pub fn write_report(report: &Report, format: OutputFormat, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let written = match format {
        OutputFormat::Csv => {
            let mut paths = Vec::new();
            for sheet in report.sheets() {
                let path = dir.join(format!("{}_{}.csv", report.stem(), sheet.file_slug()));
                fs::write(&path, sheet_to_csv(&sheet)?)?;
                paths.push(path);
            }
            paths
        }
        OutputFormat::Json => {
            let path = dir.join(format!("{}.json", report.stem()));
            fs::write(&path, serde_json::to_string_pretty(report)?)?;
            vec![path]
        }
        OutputFormat::Text => {
            let path = dir.join(format!("{}.txt", report.stem()));
            fs::write(&path, format_text(report))?;
            vec![path]
        }
    };

    for path in &written {
        debug!("Wrote output to {}", path.display());
    }
    Ok(written)
}

/// Plain text summary of a report.
pub fn format_text(report: &Report) -> String {
    let mut output = String::new();

    output.push_str(&format!("Report: {}\n", report.filename));
    output.push_str(&format!("Records: {}\n", report.records.len()));
    output.push('\n');

    output.push_str("Invoices:\n");
    for verdict in &report.validation {
        output.push_str(&format!(
            "  {:<12} declared {:>12}  calculated {:>12}  {}\n",
            verdict.invoice_number.as_deref().unwrap_or("-"),
            verdict
                .declared_total
                .map(|d| format!("{:.2}", d))
                .unwrap_or_else(|| "-".to_string()),
            verdict
                .calculated_total
                .map(|c| format!("{:.2}", c))
                .unwrap_or_else(|| "-".to_string()),
            verdict.status.label()
        ));
    }

    let summary = ReconciliationSummary::from_verdicts(&report.validation);
    output.push('\n');
    output.push_str(&format!(
        "Matched: {}  Mismatched: {}  No declared total: {}  Overflowed: {}\n",
        summary.matched, summary.mismatched, summary.missing_declared_total, summary.overflowed
    ));

    output
}

/// Print the validation table to stderr with colored verdicts.
pub fn print_validation(report: &Report) {
    eprintln!("{}", style("Invoice Validation").bold());
    for verdict in &report.validation {
        let label = match verdict.status {
            MatchStatus::Match => style(verdict.status.label()).green(),
            MatchStatus::Mismatch => style(verdict.status.label()).red(),
            MatchStatus::MissingDeclaredTotal | MatchStatus::Overflow => {
                style(verdict.status.label()).yellow()
            }
        };
        eprintln!(
            "  {:<12} declared {:>12}  calculated {:>12}  {}",
            verdict.invoice_number.as_deref().unwrap_or("-"),
            verdict
                .declared_total
                .map(|d| format!("{:.2}", d))
                .unwrap_or_else(|| "-".to_string()),
            verdict
                .calculated_total
                .map(|c| format!("{:.2}", c))
                .unwrap_or_else(|| "-".to_string()),
            label
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_to_csv_quotes_cells() {
        let sheet = Sheet {
            name: "Invoice Data".to_string(),
            headers: vec!["Site".to_string(), "Total".to_string()],
            rows: vec![vec!["DEPOT, NORTH".to_string(), "11.00".to_string()]],
        };
        assert_eq!(
            sheet_to_csv(&sheet).unwrap(),
            "Site,Total\n\"DEPOT, NORTH\",11.00\n"
        );
    }
}
