//! Statement line parsing: classification rules and record accumulation.

mod parser;
pub mod rules;

pub use parser::{ParseStats, ParsedDocument, RuleStatementParser};

use crate::error::ExtractionError;
use crate::pdf::{split_pages, PdfPage};

/// Result type for statement parsing.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for statement parsers.
pub trait StatementParser {
    /// Parse one document given as pages of text, in page order.
    fn parse_pages(&self, pages: &[PdfPage]) -> Result<ParsedDocument>;

    /// Parse one document from plain text with form-feed page breaks.
    fn parse_text(&self, text: &str) -> Result<ParsedDocument> {
        self.parse_pages(&split_pages(text))
    }
}
