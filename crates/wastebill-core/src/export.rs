//! Tabular export: the "Invoice Data" and "Invoice Validation" sheets, and
//! the output filename derived from the issue date.

use chrono::Month;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::config::{ExportConfig, WastebillConfig};
use crate::models::statement::TransactionRecord;
use crate::models::validation::InvoiceVerdict;
use crate::reconcile::Reconciler;
use crate::statement::ParsedDocument;

/// Name of the records sheet.
pub const DATA_SHEET: &str = "Invoice Data";

/// Name of the reconciliation sheet.
pub const VALIDATION_SHEET: &str = "Invoice Validation";

/// Columns of the records sheet.
pub const DATA_COLUMNS: [&str; 15] = [
    "Invoice No",
    "Customer No",
    "Issue Date",
    "Transactions for this period",
    "Site",
    "Description",
    "Booking Date",
    "Qty",
    "Docket",
    "Price",
    "GST",
    "Total",
    "Additional Charges",
    "Tipping",
    "Remarks",
];

/// Columns of the reconciliation sheet.
pub const VALIDATION_COLUMNS: [&str; 4] =
    ["Invoice No", "Declared Total", "Calculated Total", "Match"];

/// A named table of text cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    fn new(name: &str, headers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Sheet name with spaces replaced, for use in file names.
    pub fn file_slug(&self) -> String {
        self.name.replace(' ', "_")
    }
}

/// Everything handed to a writer for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Output filename, e.g. `JJ_RICHARDS_March.xlsx`.
    pub filename: String,
    pub records: Vec<TransactionRecord>,
    pub validation: Vec<InvoiceVerdict>,
}

impl Report {
    pub fn new(
        records: Vec<TransactionRecord>,
        validation: Vec<InvoiceVerdict>,
        issue_date: Option<&str>,
        config: &ExportConfig,
    ) -> Self {
        Self {
            filename: export_filename(issue_date, config),
            records,
            validation,
        }
    }

    /// Reconcile a parsed document and package it for export.
    pub fn from_document(document: ParsedDocument, config: &WastebillConfig) -> Self {
        let validation = Reconciler::from_config(&config.reconcile).reconcile(&document.records);
        Self::new(
            document.records,
            validation,
            document.issue_date.as_deref(),
            &config.export,
        )
    }

    /// Filename without the `.xlsx` extension.
    pub fn stem(&self) -> &str {
        self.filename.strip_suffix(".xlsx").unwrap_or(&self.filename)
    }

    /// Both sheets, records first.
    pub fn sheets(&self) -> [Sheet; 2] {
        [data_sheet(&self.records), validation_sheet(&self.validation)]
    }
}

fn opt(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn amount(value: Decimal) -> String {
    format!("{:.2}", value)
}

/// Build the records sheet.
pub fn data_sheet(records: &[TransactionRecord]) -> Sheet {
    let mut sheet = Sheet::new(DATA_SHEET, &DATA_COLUMNS);
    for r in records {
        sheet.rows.push(vec![
            opt(r.header.invoice_number.as_deref()),
            opt(r.header.customer_number.as_deref()),
            opt(r.header.issue_date.as_deref()),
            r.header
                .declared_period_total
                .map(amount)
                .unwrap_or_default(),
            opt(r.header.site.as_deref()),
            opt(r.header.description.as_deref()),
            r.booking_date.clone(),
            r.quantity_code.clone(),
            opt(r.docket.as_deref()),
            amount(r.price),
            amount(r.gst),
            amount(r.total),
            amount(r.additional_charges),
            opt(r.tipping.as_deref()),
            r.remarks_text().unwrap_or_default(),
        ]);
    }
    sheet
}

/// Build the reconciliation sheet.
pub fn validation_sheet(verdicts: &[InvoiceVerdict]) -> Sheet {
    let mut sheet = Sheet::new(VALIDATION_SHEET, &VALIDATION_COLUMNS);
    for v in verdicts {
        sheet.rows.push(vec![
            opt(v.invoice_number.as_deref()),
            v.declared_total.map(|d| d.to_string()).unwrap_or_default(),
            v.calculated_total.map(amount).unwrap_or_default(),
            v.status.label().to_string(),
        ]);
    }
    sheet
}

/// Month name for a `DD/MM/YY` date, if the month field is 1-12.
pub fn month_name(issue_date: &str) -> Option<&'static str> {
    let month: u8 = issue_date.split('/').nth(1)?.trim().parse().ok()?;
    Month::try_from(month).ok().map(|m| m.name())
}

/// Output filename for an issue date: `<PREFIX>_<MonthName>.xlsx`.
pub fn export_filename(issue_date: Option<&str>, config: &ExportConfig) -> String {
    format!("{}.xlsx", export_stem(issue_date, config))
}

/// Output filename without extension.
pub fn export_stem(issue_date: Option<&str>, config: &ExportConfig) -> String {
    let month = issue_date
        .and_then(month_name)
        .unwrap_or(config.unknown_month.as_str());
    format!("{}_{}", config.filename_prefix, month)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::statement::{HeaderContext, SourceLine};
    use crate::models::validation::MatchStatus;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_export_filename() {
        let config = ExportConfig::default();
        assert_eq!(export_filename(Some("05/03/24"), &config), "JJ_RICHARDS_March.xlsx");
        assert_eq!(export_filename(Some("31/12/23"), &config), "JJ_RICHARDS_December.xlsx");
        assert_eq!(export_filename(Some("05/13/24"), &config), "JJ_RICHARDS_UNKNOWN_MONTH.xlsx");
        assert_eq!(export_filename(Some("05/00/24"), &config), "JJ_RICHARDS_UNKNOWN_MONTH.xlsx");
        assert_eq!(export_filename(Some("2024"), &config), "JJ_RICHARDS_UNKNOWN_MONTH.xlsx");
        assert_eq!(export_filename(None, &config), "JJ_RICHARDS_UNKNOWN_MONTH.xlsx");
    }

    #[test]
    fn test_export_stem_uses_config() {
        let config = ExportConfig {
            filename_prefix: "WASTE".to_string(),
            unknown_month: "UNDATED".to_string(),
        };
        assert_eq!(export_stem(Some("01/07/24"), &config), "WASTE_July");
        assert_eq!(export_stem(None, &config), "WASTE_UNDATED");
    }

    #[test]
    fn test_sheets() {
        let record = TransactionRecord {
            header: HeaderContext {
                invoice_number: Some("1001".to_string()),
                declared_period_total: Some(dec("72.50")),
                site: Some("MAIN DEPOT".to_string()),
                ..Default::default()
            },
            booking_date: "01/02/24".to_string(),
            quantity_code: "2 BIN".to_string(),
            docket: Some("DOC123".to_string()),
            price: dec("55"),
            gst: dec("5.5"),
            total: dec("72.5"),
            additional_charges: dec("12"),
            charges: Vec::new(),
            tipping: None,
            remarks: vec!["DUMP FEE".to_string(), "GATE LOCKED".to_string()],
            source: SourceLine {
                page: 1,
                text: String::new(),
            },
        };
        let verdict = InvoiceVerdict {
            invoice_number: Some("1001".to_string()),
            declared_total: Some(dec("72.50")),
            calculated_total: Some(dec("72.50")),
            difference: Some(Decimal::ZERO),
            record_count: 1,
            status: MatchStatus::Match,
        };

        let report = Report::new(
            vec![record],
            vec![verdict],
            Some("28/02/24"),
            &ExportConfig::default(),
        );
        let [data, validation] = report.sheets();

        assert_eq!(report.stem(), "JJ_RICHARDS_February");
        assert_eq!(data.name, "Invoice Data");
        assert_eq!(data.file_slug(), "Invoice_Data");
        assert_eq!(data.headers.len(), data.rows[0].len());
        assert_eq!(
            data.rows[0],
            vec![
                "1001", "", "", "72.50", "MAIN DEPOT", "", "01/02/24", "2 BIN", "DOC123",
                "55.00", "5.50", "72.50", "12.00", "", "DUMP FEE | GATE LOCKED",
            ]
        );
        assert_eq!(validation.rows[0], vec!["1001", "72.50", "72.50", "YES"]);
    }
}
