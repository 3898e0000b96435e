//! Invoice reconciliation: declared period totals against summed line totals.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::models::config::ReconcileConfig;
use crate::models::statement::TransactionRecord;
use crate::models::validation::{InvoiceVerdict, MatchStatus};

/// Compares each invoice's declared total with the sum of its records.
#[derive(Debug, Clone)]
pub struct Reconciler {
    tolerance: Decimal,
}

impl Reconciler {
    /// Create a reconciler with a one-cent tolerance.
    pub fn new() -> Self {
        Self::from_config(&ReconcileConfig::default())
    }

    /// Create a reconciler from configuration.
    pub fn from_config(config: &ReconcileConfig) -> Self {
        Self {
            tolerance: config.tolerance.abs(),
        }
    }

    /// Set the match tolerance (exclusive).
    pub fn with_tolerance(mut self, tolerance: Decimal) -> Self {
        self.tolerance = tolerance.abs();
        self
    }

    /// Produce one verdict per invoice, in order of first appearance.
    ///
    /// Records read before any invoice header form their own group with no
    /// invoice number. A missing declared total yields
    /// [`MatchStatus::MissingDeclaredTotal`] and a sum outside the decimal
    /// range yields [`MatchStatus::Overflow`]; neither is an error.
    pub fn reconcile(&self, records: &[TransactionRecord]) -> Vec<InvoiceVerdict> {
        let mut groups: Vec<(Option<&str>, Vec<&TransactionRecord>)> = Vec::new();

        for record in records {
            let key = record.header.invoice_number.as_deref();
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(record),
                None => groups.push((key, vec![record])),
            }
        }

        groups
            .into_iter()
            .map(|(invoice, members)| self.verdict(invoice, &members))
            .collect()
    }

    fn verdict(&self, invoice: Option<&str>, members: &[&TransactionRecord]) -> InvoiceVerdict {
        let declared = members
            .first()
            .and_then(|r| r.header.declared_period_total);
        let calculated = members
            .iter()
            .try_fold(Decimal::ZERO, |sum, r| sum.checked_add(r.total));
        let difference = calculated
            .zip(declared)
            .and_then(|(c, d)| c.checked_sub(d));

        let status = match (calculated, declared, difference) {
            (None, _, _) => MatchStatus::Overflow,
            (Some(_), None, _) => MatchStatus::MissingDeclaredTotal,
            (Some(_), Some(_), None) => MatchStatus::Overflow,
            (Some(_), Some(_), Some(diff)) if diff.abs() < self.tolerance => MatchStatus::Match,
            (Some(_), Some(_), Some(_)) => MatchStatus::Mismatch,
        };

        if status == MatchStatus::Overflow {
            warn!(
                "Invoice {}: line totals out of range, verdict indeterminate",
                invoice.unwrap_or("<none>")
            );
        }
        debug!(
            "Invoice {}: declared {:?}, calculated {:?} -> {:?}",
            invoice.unwrap_or("<none>"),
            declared,
            calculated,
            status
        );

        InvoiceVerdict {
            invoice_number: invoice.map(str::to_string),
            declared_total: declared,
            calculated_total: calculated.map(|c| c.round_dp(2)),
            difference,
            record_count: members.len(),
            status,
        }
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

/// Reconcile with the default one-cent tolerance.
pub fn reconcile(records: &[TransactionRecord]) -> Vec<InvoiceVerdict> {
    Reconciler::new().reconcile(records)
}
