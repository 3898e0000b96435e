//! Error types for the wastebill-core library.

use thiserror::Error;

/// Main error type for the wastebill library.
#[derive(Error, Debug)]
pub enum WastebillError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Statement extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// No page carries extractable text (scanned document).
    #[error("PDF has no extractable text")]
    NoText,
}

/// Errors raised while turning statement lines into records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// A monetary column on a matched line is not a valid decimal.
    #[error("malformed amount {value:?} on page {page}: {line}")]
    MalformedAmount {
        page: u32,
        line: String,
        value: String,
    },

    /// Adding the amounts of a line (or a charge to its record) leaves the
    /// decimal range.
    #[error("amount overflow on page {page}: {line}")]
    AmountOverflow { page: u32, line: String },

    /// The document has more lines than the configured bound.
    #[error("document exceeds the limit of {limit} lines")]
    LineLimitExceeded { limit: usize },

    /// No transaction records could be extracted.
    #[error("no invoice data extracted")]
    NoData,
}

/// Result type for the wastebill library.
pub type Result<T> = std::result::Result<T, WastebillError>;
