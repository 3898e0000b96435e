//! PDF processing module.

mod extractor;

pub use extractor::PdfExtractor;

use serde::{Deserialize, Serialize};

use crate::error::PdfError;

/// Page separator written by text extractors such as `pdftotext`.
pub const FORM_FEED: char = '\u{000C}';

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text of a single PDF page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Extracted text from this page.
    pub text: String,
}

/// Split pre-extracted text into pages at form feeds.
///
/// A trailing form feed does not open an empty last page.
pub fn split_pages(text: &str) -> Vec<PdfPage> {
    let mut parts: Vec<&str> = text.split(FORM_FEED).collect();
    if parts.len() > 1 && parts.last().is_some_and(|p| p.trim().is_empty()) {
        parts.pop();
    }

    parts
        .into_iter()
        .enumerate()
        .map(|(i, part)| PdfPage {
            number: i as u32 + 1,
            text: part.to_string(),
        })
        .collect()
}

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text page by page, in page order.
    fn extract_pages(&self) -> Result<Vec<PdfPage>>;
}
