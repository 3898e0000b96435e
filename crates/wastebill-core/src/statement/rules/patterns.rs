//! Regex patterns for the vendor's statement layout.

use lazy_static::lazy_static;
use regex::Regex;

/// Monetary column: optional sign, digits with thousands commas, two decimals.
pub const AMOUNT: &str = r"(-?\d[\d,]*\.\d{2})";

lazy_static! {
    // Header context (searched anywhere in the line)
    pub static ref INVOICE_NO: Regex = Regex::new(
        r"Invoice No:\s+(\d+)"
    ).unwrap();

    pub static ref CUSTOMER_NO: Regex = Regex::new(
        r"Customer No:\s+(\d+)"
    ).unwrap();

    pub static ref ISSUE_DATE: Regex = Regex::new(
        r"Issue Date:\s+([\d/]+)"
    ).unwrap();

    pub static ref PERIOD_TOTAL: Regex = Regex::new(
        r"Transactions for this period\s+\$([\d,]+\.\d{2})"
    ).unwrap();

    // Site and description markers (anchored)
    pub static ref SITE_MARKER: Regex = Regex::new(
        r"^\((.*?)\)"
    ).unwrap();

    pub static ref DESCRIPTION_MARKER: Regex = Regex::new(
        r"^\*\*\*\s+(.*)"
    ).unwrap();

    // Booking lines: date, quantity, category, [docket], price, GST, total
    pub static ref BOOKING_STRICT: Regex = Regex::new(&format!(
        r"^(\d{{2}}/\d{{2}}/\d{{2}})\s+(\d+)\s+(BIN|SERVICE|BINS|SERVICES)\s+(\S+)?\s+{AMOUNT}\s+{AMOUNT}\s+{AMOUNT}"
    )).unwrap();

    pub static ref BOOKING_GENERAL: Regex = Regex::new(&format!(
        r"^(\d{{2}}/\d{{2}}/\d{{2}})\s+(\d+)\s+([A-Z0-9/.-]+)\s+{AMOUNT}\s+{AMOUNT}\s+{AMOUNT}"
    )).unwrap();

    // Trailing annotations for the current record
    pub static ref ADDITIONAL_CHARGE: Regex = Regex::new(&format!(
        r"(?i)^(DUMP FEE|OTHER CHARGE.*?)\s+{AMOUNT}\s+{AMOUNT}\s+{AMOUNT}"
    )).unwrap();

    pub static ref DOCKET_REF: Regex = Regex::new(
        r"^(?:O/N:|#)\s*([A-Z0-9/-]+)"
    ).unwrap();

    pub static ref TIPPING: Regex = Regex::new(
        r"(?i)^([\d,.]+\s*(?:LITRES|T))"
    ).unwrap();
}
