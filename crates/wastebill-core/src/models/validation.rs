//! Invoice reconciliation results.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of comparing an invoice's declared total with its line totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Line totals agree with the declared total within tolerance.
    Match,
    /// Line totals differ from the declared total.
    Mismatch,
    /// The invoice never declared a period total.
    MissingDeclaredTotal,
    /// The line totals cannot be summed within the decimal range.
    Overflow,
}

impl MatchStatus {
    /// Whether the invoice reconciled.
    pub fn is_match(&self) -> bool {
        matches!(self, MatchStatus::Match)
    }

    /// Label used in exported tables.
    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::Match => "YES",
            MatchStatus::Mismatch => "NO",
            MatchStatus::MissingDeclaredTotal => "NO DECLARED TOTAL",
            MatchStatus::Overflow => "TOTAL OVERFLOW",
        }
    }
}

/// Reconciliation verdict for one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceVerdict {
    /// Invoice number; `None` groups records read before any invoice header.
    pub invoice_number: Option<String>,

    /// Declared period total, as printed.
    pub declared_total: Option<Decimal>,

    /// Sum of record totals, rounded to cents; `None` when the sum overflows.
    pub calculated_total: Option<Decimal>,

    /// Unrounded `calculated - declared`, when a declared total exists.
    pub difference: Option<Decimal>,

    /// Number of records in the invoice.
    pub record_count: usize,

    /// Verdict.
    pub status: MatchStatus,
}

/// Counts of verdicts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub matched: usize,
    pub mismatched: usize,
    pub missing_declared_total: usize,
    pub overflowed: usize,
}

impl ReconciliationSummary {
    /// Tally a set of verdicts.
    pub fn from_verdicts(verdicts: &[InvoiceVerdict]) -> Self {
        let mut summary = Self::default();
        for verdict in verdicts {
            match verdict.status {
                MatchStatus::Match => summary.matched += 1,
                MatchStatus::Mismatch => summary.mismatched += 1,
                MatchStatus::MissingDeclaredTotal => summary.missing_declared_total += 1,
                MatchStatus::Overflow => summary.overflowed += 1,
            }
        }
        summary
    }

    /// Total number of invoices.
    pub fn invoices(&self) -> usize {
        self.matched + self.mismatched + self.missing_declared_total + self.overflowed
    }

    /// Whether every invoice reconciled.
    pub fn all_matched(&self) -> bool {
        self.matched == self.invoices()
    }
}
