//! Statement data models: running header context and transaction records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Separator used when rendering remarks as a single cell.
pub const REMARK_SEPARATOR: &str = " | ";

/// Header fields carried forward from line to line while a document is parsed.
///
/// One instance lives for the whole parse of a document. Invoices can span
/// page boundaries, so nothing here is cleared by a new page or a new invoice
/// number; fields are only ever overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderContext {
    /// Vendor invoice number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    /// Customer account number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_number: Option<String>,

    /// Issue date as printed (DD/MM/YY).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,

    /// Total the vendor declares for the invoice period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_period_total: Option<Decimal>,

    /// Service site, from the latest `(SITE)` marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,

    /// Service description, from the latest `*** DESCRIPTION` marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl HeaderContext {
    /// Switch to a new site. A site change always drops the description.
    pub fn enter_site(&mut self, site: impl Into<String>) {
        self.site = Some(site.into());
        self.description = None;
    }
}

/// Where a record came from in the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLine {
    /// Page number (1-indexed).
    pub page: u32,
    /// Normalized line text.
    pub text: String,
}

/// An additional charge (dump fee, other charge) folded into a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalCharge {
    /// Charge label as printed, e.g. `DUMP FEE`.
    pub description: String,
    /// Price column of the charge line.
    pub price: Decimal,
    /// GST column of the charge line.
    pub gst: Decimal,
    /// Total column of the charge line; the value added to the record.
    pub total: Decimal,
}

/// A single billed transaction with its trailing annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Header context as it was when the booking line was read.
    pub header: HeaderContext,

    /// Booking date as printed (DD/MM/YY).
    pub booking_date: String,

    /// Quantity and category code, e.g. `2 BIN`.
    pub quantity_code: String,

    /// Docket (pickup/service reference).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docket: Option<String>,

    /// Price before GST.
    pub price: Decimal,

    /// GST amount.
    pub gst: Decimal,

    /// Line total, including additional charges.
    pub total: Decimal,

    /// Sum of additional charges folded into `total`.
    pub additional_charges: Decimal,

    /// Individual additional charges, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub charges: Vec<AdditionalCharge>,

    /// Tipping weight or volume, e.g. `1.25 T` or `660 LITRES`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipping: Option<String>,

    /// Operational remarks and charge labels, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remarks: Vec<String>,

    /// Source location of the booking line.
    pub source: SourceLine,
}

impl TransactionRecord {
    /// Fold an additional charge into this record. Returns the new total, or
    /// `None` (leaving the record untouched) when the sum leaves the decimal
    /// range.
    pub fn apply_charge(&mut self, charge: AdditionalCharge) -> Option<Decimal> {
        let additional_charges = self.additional_charges.checked_add(charge.total)?;
        let total = self.total.checked_add(charge.total)?;

        self.additional_charges = additional_charges;
        self.total = total;
        self.remarks.push(charge.description.clone());
        self.charges.push(charge);
        Some(total)
    }

    /// Remarks joined for display, or `None` when there are none.
    pub fn remarks_text(&self) -> Option<String> {
        if self.remarks.is_empty() {
            None
        } else {
            Some(self.remarks.join(REMARK_SEPARATOR))
        }
    }

    /// Printed total of the booking line, before any additional charges.
    pub fn base_total(&self) -> Decimal {
        self.total - self.additional_charges
    }
}
