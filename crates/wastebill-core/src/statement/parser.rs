//! Stateful statement parser: header context and record accumulation.

use std::collections::BTreeSet;
use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::error::ExtractionError;
use crate::models::config::ParserConfig;
use crate::models::statement::*;
use crate::pdf::PdfPage;

use super::rules::{
    classify, normalize_line, parse_amount, strip_thousands, BookingLine, ChargeLine, Lexicon,
    LineKind,
};
use super::{Result, StatementParser};

/// Line counts gathered while parsing a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Distinct pages that contributed lines.
    pub pages: usize,
    /// Lines read, including blanks.
    pub lines: usize,
    /// Blank and boilerplate lines.
    pub noise: usize,
    /// Header context updates.
    pub context: usize,
    /// Booking lines (records created).
    pub bookings: usize,
    /// Annotations applied to a record.
    pub annotations: usize,
    /// Annotations seen before any booking line.
    pub orphaned: usize,
    /// Lines matching no rule.
    pub unclassified: usize,
}

/// Result of parsing one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Extracted records, in document order.
    pub records: Vec<TransactionRecord>,
    /// Last declared period total seen in the document.
    pub declared_period_total: Option<Decimal>,
    /// Last issue date seen in the document.
    pub issue_date: Option<String>,
    /// Non-fatal oddities worth a human look.
    pub warnings: Vec<String>,
    /// Line statistics.
    pub stats: ParseStats,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ParsedDocument {
    /// Whether no record was extracted.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Turn an empty result into [`ExtractionError::NoData`].
    pub fn require_records(self) -> Result<Self> {
        if self.is_empty() {
            Err(ExtractionError::NoData)
        } else {
            Ok(self)
        }
    }
}

/// Parse a monetary column, failing with the page and line it came from.
fn amount(page: u32, line: &str, raw: &str) -> Result<Decimal> {
    parse_amount(raw).ok_or_else(|| ExtractionError::MalformedAmount {
        page,
        line: line.to_string(),
        value: raw.to_string(),
    })
}

fn overflow(page: u32, line: &str) -> ExtractionError {
    ExtractionError::AmountOverflow {
        page,
        line: line.to_string(),
    }
}

/// Per-document parse state.
///
/// Created fresh for every document, so a parser can be shared between
/// documents and threads.
#[derive(Debug, Default)]
struct ParseState {
    header: HeaderContext,
    records: Vec<TransactionRecord>,
    /// Index into `records` of the record trailing lines attach to.
    current: Option<usize>,
    pages: BTreeSet<u32>,
    stats: ParseStats,
    warnings: Vec<String>,
}

impl ParseState {
    fn current_record(&mut self) -> Option<&mut TransactionRecord> {
        self.current.and_then(|i| self.records.get_mut(i))
    }

    fn apply(&mut self, page: u32, line: &str, kind: LineKind<'_>) -> Result<()> {
        if kind.is_trailing() && self.current.is_none() {
            trace!("page {}: annotation before any booking ignored: {}", page, line);
            self.stats.orphaned += 1;
            return Ok(());
        }

        match kind {
            LineKind::Noise => {
                self.stats.noise += 1;
            }
            LineKind::InvoiceNumber(number) => {
                self.header.invoice_number = Some(number.to_string());
                self.stats.context += 1;
            }
            LineKind::CustomerNumber(number) => {
                self.header.customer_number = Some(number.to_string());
                self.stats.context += 1;
            }
            LineKind::IssueDate(date) => {
                self.header.issue_date = Some(date.to_string());
                self.stats.context += 1;
            }
            LineKind::DeclaredTotal(raw) => {
                self.header.declared_period_total = Some(amount(page, line, raw)?);
                self.stats.context += 1;
            }
            LineKind::Site(site) => {
                self.header.enter_site(site);
                self.stats.context += 1;
            }
            LineKind::Description(description) => {
                self.header.description = Some(description.to_string());
                self.stats.context += 1;
            }
            LineKind::Booking(booking) => {
                self.push_booking(page, line, booking)?;
            }
            LineKind::AdditionalCharge(charge) => {
                self.apply_charge(page, line, charge)?;
            }
            LineKind::Docket(docket) => {
                if let Some(record) = self.current_record() {
                    record.docket = Some(docket.to_string());
                }
                self.stats.annotations += 1;
            }
            LineKind::Tipping(tipping) => {
                if let Some(record) = self.current_record() {
                    record.tipping = Some(strip_thousands(tipping));
                }
                self.stats.annotations += 1;
            }
            LineKind::Remark(remark) => {
                if let Some(record) = self.current_record() {
                    record.remarks.push(remark.to_string());
                }
                self.stats.annotations += 1;
            }
            LineKind::Unclassified => {
                trace!("page {}: discarded: {}", page, line);
                self.stats.unclassified += 1;
            }
        }

        Ok(())
    }

    fn push_booking(&mut self, page: u32, line: &str, booking: BookingLine<'_>) -> Result<()> {
        let price = amount(page, line, booking.price)?;
        let gst = amount(page, line, booking.gst)?;
        let total = amount(page, line, booking.total)?;
        let expected = price
            .checked_add(gst)
            .ok_or_else(|| overflow(page, line))?;

        if expected != total {
            let message = format!(
                "page {}: line total {} differs from price + GST {} ({})",
                page, total, expected, line
            );
            warn!("{}", message);
            self.warnings.push(message);
        }

        self.records.push(TransactionRecord {
            header: self.header.clone(),
            booking_date: booking.booking_date.to_string(),
            quantity_code: booking.quantity_code(),
            docket: booking.docket.map(str::to_string),
            price,
            gst,
            total,
            additional_charges: Decimal::ZERO,
            charges: Vec::new(),
            tipping: None,
            remarks: Vec::new(),
            source: SourceLine {
                page,
                text: line.to_string(),
            },
        });
        self.current = Some(self.records.len() - 1);
        self.stats.bookings += 1;
        Ok(())
    }

    fn apply_charge(&mut self, page: u32, line: &str, charge: ChargeLine<'_>) -> Result<()> {
        let charge = AdditionalCharge {
            description: charge.description.to_string(),
            price: amount(page, line, charge.price)?,
            gst: amount(page, line, charge.gst)?,
            total: amount(page, line, charge.total)?,
        };

        if !charge.price.is_zero() || !charge.gst.is_zero() {
            let message = format!(
                "page {}: {} carries price {} and GST {}; only its total {} is added",
                page, charge.description, charge.price, charge.gst, charge.total
            );
            warn!("{}", message);
            self.warnings.push(message);
        }

        if let Some(record) = self.current_record() {
            record.apply_charge(charge).ok_or_else(|| overflow(page, line))?;
        }
        self.stats.annotations += 1;
        Ok(())
    }

    fn finish(mut self, started: Instant) -> ParsedDocument {
        self.stats.pages = self.pages.len();
        ParsedDocument {
            records: self.records,
            declared_period_total: self.header.declared_period_total,
            issue_date: self.header.issue_date,
            warnings: self.warnings,
            stats: self.stats,
            processing_time_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// Rule-based parser for the vendor's statement text.
#[derive(Debug, Clone, Default)]
pub struct RuleStatementParser {
    lexicon: Lexicon,
    /// Maximum lines per document (0 = unlimited).
    max_lines: usize,
}

impl RuleStatementParser {
    /// Create a parser with the built-in vocabulary and no line limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser from configuration.
    pub fn from_config(config: &ParserConfig) -> Self {
        Self {
            lexicon: Lexicon::from_config(config),
            max_lines: config.max_lines,
        }
    }

    /// Set the maximum number of lines per document (0 = unlimited).
    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines;
        self
    }

    /// Parse a document given as `(page, line)` pairs in document order.
    pub fn parse_lines<I, S>(&self, lines: I) -> Result<ParsedDocument>
    where
        I: IntoIterator<Item = (u32, S)>,
        S: AsRef<str>,
    {
        let started = Instant::now();
        let mut state = ParseState::default();

        for (page, raw) in lines {
            state.stats.lines += 1;
            if self.max_lines > 0 && state.stats.lines > self.max_lines {
                return Err(ExtractionError::LineLimitExceeded {
                    limit: self.max_lines,
                });
            }
            state.pages.insert(page);

            let line = normalize_line(raw.as_ref());
            let kind = classify(&line, &self.lexicon);
            state.apply(page, &line, kind)?;
        }

        let document = state.finish(started);
        debug!(
            "Parsed {} lines: {} noise, {} context, {} bookings, {} annotations ({} orphaned), {} unclassified",
            document.stats.lines,
            document.stats.noise,
            document.stats.context,
            document.stats.bookings,
            document.stats.annotations,
            document.stats.orphaned,
            document.stats.unclassified
        );

        Ok(document)
    }
}

impl StatementParser for RuleStatementParser {
    fn parse_pages(&self, pages: &[PdfPage]) -> Result<ParsedDocument> {
        info!("Parsing statement from {} pages", pages.len());

        let document = self.parse_lines(
            pages
                .iter()
                .flat_map(|page| page.text.lines().map(move |line| (page.number, line))),
        )?;

        info!(
            "Extracted {} records in {}ms",
            document.records.len(),
            document.processing_time_ms
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn parse(lines: &[&str]) -> ParsedDocument {
        RuleStatementParser::new()
            .parse_lines(lines.iter().map(|l| (1, *l)))
            .unwrap()
    }

    #[test]
    fn test_strict_booking_line() {
        let doc = parse(&["01/02/24 2 BIN DOC123 55.00 5.50 60.50"]);

        assert_eq!(doc.records.len(), 1);
        let rec = &doc.records[0];
        assert_eq!(rec.booking_date, "01/02/24");
        assert_eq!(rec.quantity_code, "2 BIN");
        assert_eq!(rec.docket.as_deref(), Some("DOC123"));
        assert_eq!(rec.price, dec("55.00"));
        assert_eq!(rec.gst, dec("5.50"));
        assert_eq!(rec.total, dec("60.50"));
        assert_eq!(rec.additional_charges, Decimal::ZERO);
        assert_eq!(rec.tipping, None);
        assert_eq!(rec.remarks_text(), None);
        assert!(doc.warnings.is_empty());
    }

    #[test]
    fn test_dump_fee_adds_to_current_record() {
        let doc = parse(&[
            "01/02/24 2 BIN DOC123 55.00 5.50 60.50",
            "DUMP FEE 0.00 0.00 12.00",
        ]);

        let rec = &doc.records[0];
        assert_eq!(rec.total, dec("72.50"));
        assert_eq!(rec.additional_charges, dec("12.00"));
        assert!(rec.remarks.contains(&"DUMP FEE".to_string()));
        assert_eq!(rec.charges.len(), 1);
        assert!(doc.warnings.is_empty());
    }

    #[test]
    fn test_charge_with_price_columns_is_reported() {
        let doc = parse(&[
            "01/02/24 1 SERVICE 20.00 2.00 22.00",
            "OTHER CHARGE CONTAMINATION 10.00 1.00 11.00",
        ]);

        let rec = &doc.records[0];
        assert_eq!(rec.total, dec("33.00"));
        assert_eq!(rec.price, dec("20.00"));
        assert_eq!(rec.charges[0].gst, dec("1.00"));
        assert_eq!(doc.warnings.len(), 1);
    }

    #[test]
    fn test_site_marker_resets_description() {
        let doc = parse(&[
            "(OLD YARD)",
            "*** GENERAL WASTE",
            "01/02/24 1 BIN 10.00 1.00 11.00",
            "(MAIN DEPOT)",
            "02/02/24 1 BIN 10.00 1.00 11.00",
            "*** RECYCLING",
            "03/02/24 1 BIN 10.00 1.00 11.00",
        ]);

        let sites: Vec<(Option<&str>, Option<&str>)> = doc
            .records
            .iter()
            .map(|r| (r.header.site.as_deref(), r.header.description.as_deref()))
            .collect();
        assert_eq!(
            sites,
            vec![
                (Some("OLD YARD"), Some("GENERAL WASTE")),
                (Some("MAIN DEPOT"), None),
                (Some("MAIN DEPOT"), Some("RECYCLING")),
            ]
        );
    }

    #[test]
    fn test_annotations_before_first_booking_are_noops() {
        let doc = parse(&[
            "DUMP FEE 0.00 0.00 12.00",
            "# 4411",
            "1.5 T",
            "GATE LOCKED",
            "01/02/24 1 BIN 10.00 1.00 11.00",
        ]);

        let rec = &doc.records[0];
        assert_eq!(rec.total, dec("11.00"));
        assert_eq!(rec.docket, None);
        assert_eq!(rec.tipping, None);
        assert!(rec.remarks.is_empty());
        assert_eq!(doc.stats.orphaned, 4);
    }

    #[test]
    fn test_trailing_annotations_target_latest_record() {
        let doc = parse(&[
            "01/02/24 1 BIN 10.00 1.00 11.00",
            "02/02/24 1 SKIP 100.00 10.00 110.00",
            "O/N: 77-1/B",
            "1,250.5 T",
            "Bin was empty",
            "excess weight charged",
            "Driver waited 10 minutes",
        ]);

        assert_eq!(doc.records[0].docket, None);
        assert!(doc.records[0].remarks.is_empty());

        let rec = &doc.records[1];
        assert_eq!(rec.docket.as_deref(), Some("77-1/B"));
        assert_eq!(rec.tipping.as_deref(), Some("1250.5 T"));
        assert_eq!(
            rec.remarks_text().as_deref(),
            Some("Bin was empty | excess weight charged")
        );
        assert_eq!(doc.stats.unclassified, 1);
    }

    #[test]
    fn test_noise_line_leaves_context_untouched() {
        let doc = parse(&[
            "Invoice No: 1001",
            "Page 3 of 10",
            "Page 4 Invoice No: 9999",
            "01/02/24 1 BIN 10.00 1.00 11.00",
        ]);

        assert_eq!(doc.records.len(), 1);
        assert_eq!(doc.records[0].header.invoice_number.as_deref(), Some("1001"));
        assert_eq!(doc.stats.noise, 2);
    }

    #[test]
    fn test_header_snapshot_and_last_seen_values() {
        let doc = parse(&[
            "Invoice No: 1001",
            "Customer No: 55",
            "Issue Date: 31/01/24",
            "Transactions for this period $11.00",
            "01/02/24 1 BIN 10.00 1.00 11.00",
            "Invoice No: 1002",
            "Issue Date: 29/02/24",
            "Transactions for this period $1,100.00",
            "02/02/24 1 BIN 1,000.00 100.00 1,100.00",
        ]);

        assert_eq!(doc.records[0].header.invoice_number.as_deref(), Some("1001"));
        assert_eq!(doc.records[0].header.declared_period_total, Some(dec("11.00")));
        assert_eq!(doc.records[1].header.invoice_number.as_deref(), Some("1002"));
        assert_eq!(doc.records[1].header.customer_number.as_deref(), Some("55"));
        assert_eq!(doc.records[1].total, dec("1100.00"));
        assert_eq!(doc.declared_period_total, Some(dec("1100.00")));
        assert_eq!(doc.issue_date.as_deref(), Some("29/02/24"));
    }

    #[test]
    fn test_unicode_minus_is_normalized() {
        let doc = parse(&["05/02/24 1 CREDIT \u{2212}10.00 \u{2212}1.00 \u{2212}11.00"]);
        assert_eq!(doc.records[0].total, dec("-11.00"));
    }

    #[test]
    fn test_total_disagreeing_with_price_and_gst_is_kept_and_reported() {
        let doc = parse(&["01/02/24 1 BIN 10.00 1.00 12.00"]);
        assert_eq!(doc.records[0].total, dec("12.00"));
        assert_eq!(doc.warnings.len(), 1);
    }

    #[test]
    fn test_malformed_amount_reports_page_and_line() {
        let line = "01/02/24 1 BIN 99999999999999999999999999999999.00 1.00 11.00";
        let err = RuleStatementParser::new()
            .parse_lines([(1, "Invoice No: 1"), (2, line)])
            .unwrap_err();

        assert_eq!(
            err,
            ExtractionError::MalformedAmount {
                page: 2,
                line: line.to_string(),
                value: "99999999999999999999999999999999.00".to_string(),
            }
        );
    }

    #[test]
    fn test_price_and_gst_sum_out_of_range_is_fatal() {
        let line = "01/02/24 1 BIN 50000000000000000000000000000.00 50000000000000000000000000000.00 1.00";
        let err = RuleStatementParser::new()
            .parse_lines([(3, line)])
            .unwrap_err();

        assert_eq!(
            err,
            ExtractionError::AmountOverflow {
                page: 3,
                line: line.to_string(),
            }
        );
    }

    #[test]
    fn test_charge_out_of_range_is_fatal() {
        let booking = "01/02/24 1 BIN 0.00 0.00 50000000000000000000000000000.00";
        let fee = "DUMP FEE 0.00 0.00 50000000000000000000000000000.00";
        let err = RuleStatementParser::new()
            .parse_lines([(1, booking), (2, fee)])
            .unwrap_err();

        assert_eq!(
            err,
            ExtractionError::AmountOverflow {
                page: 2,
                line: fee.to_string(),
            }
        );
    }

    #[test]
    fn test_line_limit() {
        let err = RuleStatementParser::new()
            .with_max_lines(2)
            .parse_lines([(1, "a"), (1, "b"), (1, "c")])
            .unwrap_err();
        assert_eq!(err, ExtractionError::LineLimitExceeded { limit: 2 });
    }

    #[test]
    fn test_empty_document() {
        let doc = parse(&["Remittance Advice", "Thank you"]);
        assert!(doc.is_empty());
        assert_eq!(doc.require_records().unwrap_err(), ExtractionError::NoData);
    }

    #[test]
    fn test_parse_pages_carries_context_across_pages() {
        let pages = vec![
            PdfPage {
                number: 1,
                text: "Invoice No: 1001\n(MAIN DEPOT)\n01/02/24 1 BIN 10.00 1.00 11.00".to_string(),
            },
            PdfPage {
                number: 2,
                text: "Continued from previous page\n# 5512\n02/02/24 1 BIN 10.00 1.00 11.00".to_string(),
            },
        ];

        let doc = RuleStatementParser::new().parse_pages(&pages).unwrap();

        assert_eq!(doc.stats.pages, 2);
        assert_eq!(doc.records[0].docket.as_deref(), Some("5512"));
        assert_eq!(doc.records[1].header.site.as_deref(), Some("MAIN DEPOT"));
        assert_eq!(doc.records[1].header.invoice_number.as_deref(), Some("1001"));
        assert_eq!(doc.records[1].source.page, 2);
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let lines = [
            "Invoice No: 1001",
            "Transactions for this period $23.00",
            "01/02/24 1 BIN 10.00 1.00 11.00",
            "DUMP FEE 0.00 0.00 12.00",
        ];
        let first = parse(&lines);
        let second = parse(&lines);
        assert_eq!(first.records, second.records);
    }
}
