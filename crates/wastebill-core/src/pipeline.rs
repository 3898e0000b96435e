//! End-to-end extraction: document bytes or text in, parsed records and
//! export report out.

use tracing::{debug, info};

use crate::error::Result;
use crate::export::Report;
use crate::models::config::WastebillConfig;
use crate::pdf::{split_pages, PdfExtractor, PdfPage, PdfProcessor};
use crate::statement::{ParsedDocument, RuleStatementParser, StatementParser};

/// A configured parser plus the settings needed to read and export documents.
///
/// Holds no per-document state; one pipeline can serve many documents
/// concurrently.
#[derive(Debug, Clone)]
pub struct Pipeline {
    parser: RuleStatementParser,
    config: WastebillConfig,
}

impl Pipeline {
    /// Build a pipeline, rejecting settings that cannot work.
    pub fn new(config: WastebillConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            parser: RuleStatementParser::from_config(&config.parser),
            config,
        })
    }

    /// Extract page text from PDF bytes.
    pub fn read_pdf(&self, data: &[u8]) -> Result<Vec<PdfPage>> {
        let mut extractor = PdfExtractor::new().with_max_pages(self.config.pdf.max_pages);
        extractor.load(data)?;
        debug!("PDF has {} pages", extractor.page_count());
        Ok(extractor.extract_all()?)
    }

    /// Split pre-extracted text into pages, honouring the page limit.
    pub fn read_text(&self, text: &str) -> Vec<PdfPage> {
        let mut pages = split_pages(text);
        if self.config.pdf.max_pages > 0 {
            pages.truncate(self.config.pdf.max_pages);
        }
        pages
    }

    /// Parse pages into records.
    pub fn parse_pages(&self, pages: &[PdfPage]) -> Result<ParsedDocument> {
        Ok(self.parser.parse_pages(pages)?)
    }

    /// Read and parse a PDF.
    pub fn parse_pdf(&self, data: &[u8]) -> Result<ParsedDocument> {
        let pages = self.read_pdf(data)?;
        self.parse_pages(&pages)
    }

    /// Parse pre-extracted text with form-feed page breaks.
    pub fn parse_text(&self, text: &str) -> Result<ParsedDocument> {
        self.parse_pages(&self.read_text(text))
    }

    /// Reconcile a parsed document and package it for export.
    pub fn report(&self, document: ParsedDocument) -> Report {
        let report = Report::from_document(document, &self.config);
        info!(
            "Report {}: {} records, {} invoices",
            report.filename,
            report.records.len(),
            report.validation.len()
        );
        report
    }
}
