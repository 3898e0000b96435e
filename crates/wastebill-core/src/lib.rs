//! Core library for waste-management invoice extraction.
//!
//! This crate provides:
//! - PDF text extraction, page by page
//! - A rule-based statement parser turning page lines into transaction records
//! - Invoice reconciliation of declared period totals against line totals
//! - Export tables and output filename derivation
//! - A [`Pipeline`] tying the steps together

pub mod error;
pub mod export;
pub mod models;
pub mod pdf;
pub mod pipeline;
pub mod reconcile;
pub mod statement;

pub use error::{ExtractionError, PdfError, Result, WastebillError};
pub use export::{export_filename, Report, Sheet};
pub use models::config::WastebillConfig;
pub use models::statement::{AdditionalCharge, HeaderContext, TransactionRecord};
pub use models::validation::{InvoiceVerdict, MatchStatus, ReconciliationSummary};
pub use pdf::{split_pages, PdfExtractor, PdfPage, PdfProcessor};
pub use pipeline::Pipeline;
pub use reconcile::{reconcile, Reconciler};
pub use statement::{ParsedDocument, RuleStatementParser, StatementParser};
