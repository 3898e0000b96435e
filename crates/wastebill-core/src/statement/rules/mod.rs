//! Ordered line classification rules.
//!
//! Every normalized line is classified into exactly one [`LineKind`] by
//! walking [`RULES`] in order and taking the first rule that matches. The
//! order encodes the priorities of the statement layout: boilerplate first,
//! then header context, then booking lines (strict before general), then the
//! trailing annotations that attach to the latest booking.

pub mod amounts;
pub mod lexicon;
pub mod patterns;

pub use amounts::{normalize_line, parse_amount, strip_thousands};
pub use lexicon::{Lexicon, EXCESS_WEIGHT, NOISE_MARKERS, REMARK_PHRASES};

use patterns::*;

/// Which part of the statement a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Boilerplate filtering.
    Noise,
    /// Header context updates.
    Context,
    /// Booking (transaction) lines.
    Booking,
    /// Annotations applied to the current record.
    Trailing,
}

/// A booking line split into its columns. Amounts are still raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingLine<'a> {
    pub booking_date: &'a str,
    pub quantity: &'a str,
    pub category: &'a str,
    pub docket: Option<&'a str>,
    pub price: &'a str,
    pub gst: &'a str,
    pub total: &'a str,
}

impl BookingLine<'_> {
    /// Quantity and category as one cell, e.g. `2 BIN`.
    pub fn quantity_code(&self) -> String {
        format!("{} {}", self.quantity, self.category)
    }
}

/// An additional charge line. Amounts are still raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeLine<'a> {
    pub description: &'a str,
    pub price: &'a str,
    pub gst: &'a str,
    pub total: &'a str,
}

/// Classification of a single normalized line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Empty line or page boilerplate.
    Noise,
    InvoiceNumber(&'a str),
    CustomerNumber(&'a str),
    IssueDate(&'a str),
    /// Declared period total, raw amount text.
    DeclaredTotal(&'a str),
    Site(&'a str),
    Description(&'a str),
    Booking(BookingLine<'a>),
    AdditionalCharge(ChargeLine<'a>),
    Docket(&'a str),
    Tipping(&'a str),
    Remark(&'a str),
    /// Matched no rule.
    Unclassified,
}

impl LineKind<'_> {
    /// Annotations that only make sense after a booking line.
    pub fn is_trailing(&self) -> bool {
        matches!(
            self,
            LineKind::AdditionalCharge(_)
                | LineKind::Docket(_)
                | LineKind::Tipping(_)
                | LineKind::Remark(_)
        )
    }
}

/// Rule predicate: returns the line's kind when the rule applies.
pub type Matcher = for<'a, 'b> fn(&'a str, &'b Lexicon) -> Option<LineKind<'a>>;

/// A named classification rule.
pub struct Rule {
    pub name: &'static str,
    pub stage: Stage,
    pub matcher: Matcher,
}

/// Classification rules in priority order.
pub const RULES: &[Rule] = &[
    Rule { name: "noise", stage: Stage::Noise, matcher: match_noise },
    Rule { name: "invoice_number", stage: Stage::Context, matcher: match_invoice_number },
    Rule { name: "customer_number", stage: Stage::Context, matcher: match_customer_number },
    Rule { name: "issue_date", stage: Stage::Context, matcher: match_issue_date },
    Rule { name: "declared_total", stage: Stage::Context, matcher: match_declared_total },
    Rule { name: "site", stage: Stage::Context, matcher: match_site },
    Rule { name: "description", stage: Stage::Context, matcher: match_description },
    Rule { name: "booking_strict", stage: Stage::Booking, matcher: match_booking_strict },
    Rule { name: "booking_general", stage: Stage::Booking, matcher: match_booking_general },
    Rule { name: "additional_charge", stage: Stage::Trailing, matcher: match_additional_charge },
    Rule { name: "docket", stage: Stage::Trailing, matcher: match_docket },
    Rule { name: "tipping", stage: Stage::Trailing, matcher: match_tipping },
    Rule { name: "remark", stage: Stage::Trailing, matcher: match_remark },
];

/// Classify a normalized line.
pub fn classify<'a>(line: &'a str, lexicon: &Lexicon) -> LineKind<'a> {
    RULES
        .iter()
        .find_map(|rule| (rule.matcher)(line, lexicon))
        .unwrap_or(LineKind::Unclassified)
}

/// Name of the rule that classifies a line, if any. Used for diagnostics.
pub fn matching_rule(line: &str, lexicon: &Lexicon) -> Option<&'static str> {
    RULES
        .iter()
        .find(|rule| (rule.matcher)(line, lexicon).is_some())
        .map(|rule| rule.name)
}

fn match_noise<'a>(line: &'a str, lexicon: &Lexicon) -> Option<LineKind<'a>> {
    lexicon.is_noise(line).then_some(LineKind::Noise)
}

fn match_invoice_number<'a>(line: &'a str, _: &Lexicon) -> Option<LineKind<'a>> {
    INVOICE_NO
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| LineKind::InvoiceNumber(m.as_str()))
}

fn match_customer_number<'a>(line: &'a str, _: &Lexicon) -> Option<LineKind<'a>> {
    CUSTOMER_NO
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| LineKind::CustomerNumber(m.as_str()))
}

fn match_issue_date<'a>(line: &'a str, _: &Lexicon) -> Option<LineKind<'a>> {
    ISSUE_DATE
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| LineKind::IssueDate(m.as_str()))
}

fn match_declared_total<'a>(line: &'a str, _: &Lexicon) -> Option<LineKind<'a>> {
    PERIOD_TOTAL
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| LineKind::DeclaredTotal(m.as_str()))
}

fn match_site<'a>(line: &'a str, _: &Lexicon) -> Option<LineKind<'a>> {
    SITE_MARKER
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| LineKind::Site(m.as_str().trim()))
}

fn match_description<'a>(line: &'a str, _: &Lexicon) -> Option<LineKind<'a>> {
    DESCRIPTION_MARKER
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| LineKind::Description(m.as_str().trim()))
}

fn match_booking_strict<'a>(line: &'a str, _: &Lexicon) -> Option<LineKind<'a>> {
    let caps = BOOKING_STRICT.captures(line)?;
    Some(LineKind::Booking(BookingLine {
        booking_date: caps.get(1)?.as_str(),
        quantity: caps.get(2)?.as_str(),
        category: caps.get(3)?.as_str(),
        docket: caps.get(4).map(|m| m.as_str()),
        price: caps.get(5)?.as_str(),
        gst: caps.get(6)?.as_str(),
        total: caps.get(7)?.as_str(),
    }))
}

fn match_booking_general<'a>(line: &'a str, _: &Lexicon) -> Option<LineKind<'a>> {
    let caps = BOOKING_GENERAL.captures(line)?;
    Some(LineKind::Booking(BookingLine {
        booking_date: caps.get(1)?.as_str(),
        quantity: caps.get(2)?.as_str(),
        category: caps.get(3)?.as_str(),
        docket: None,
        price: caps.get(4)?.as_str(),
        gst: caps.get(5)?.as_str(),
        total: caps.get(6)?.as_str(),
    }))
}

fn match_additional_charge<'a>(line: &'a str, _: &Lexicon) -> Option<LineKind<'a>> {
    let caps = ADDITIONAL_CHARGE.captures(line)?;
    Some(LineKind::AdditionalCharge(ChargeLine {
        description: caps.get(1)?.as_str().trim(),
        price: caps.get(2)?.as_str(),
        gst: caps.get(3)?.as_str(),
        total: caps.get(4)?.as_str(),
    }))
}

fn match_docket<'a>(line: &'a str, _: &Lexicon) -> Option<LineKind<'a>> {
    DOCKET_REF
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| LineKind::Docket(m.as_str()))
}

fn match_tipping<'a>(line: &'a str, _: &Lexicon) -> Option<LineKind<'a>> {
    TIPPING
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| LineKind::Tipping(m.as_str()))
}

fn match_remark<'a>(line: &'a str, lexicon: &Lexicon) -> Option<LineKind<'a>> {
    lexicon.is_remark(line).then_some(LineKind::Remark(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kind(line: &str) -> LineKind<'_> {
        classify(line, &Lexicon::new())
    }

    #[test]
    fn test_context_lines() {
        assert_eq!(kind("Tax Invoice  Invoice No: 88123401"), LineKind::InvoiceNumber("88123401"));
        assert_eq!(kind("Customer No: 40211"), LineKind::CustomerNumber("40211"));
        assert_eq!(kind("Issue Date: 05/03/24"), LineKind::IssueDate("05/03/24"));
        assert_eq!(
            kind("Transactions for this period $1,024.50"),
            LineKind::DeclaredTotal("1,024.50")
        );
        assert_eq!(kind("( MAIN DEPOT )"), LineKind::Site("MAIN DEPOT"));
        assert_eq!(kind("*** GENERAL WASTE 240L"), LineKind::Description("GENERAL WASTE 240L"));
    }

    #[test]
    fn test_strict_booking_wins_over_general() {
        assert_eq!(
            kind("01/02/24 2 BIN DOC123 55.00 5.50 60.50"),
            LineKind::Booking(BookingLine {
                booking_date: "01/02/24",
                quantity: "2",
                category: "BIN",
                docket: Some("DOC123"),
                price: "55.00",
                gst: "5.50",
                total: "60.50",
            })
        );
    }

    #[test]
    fn test_general_booking_covers_other_categories() {
        let LineKind::Booking(booking) = kind("02/02/24 1 SKIP6M 310.00 31.00 341.00") else {
            panic!("expected booking line");
        };
        assert_eq!(booking.quantity_code(), "1 SKIP6M");
        assert_eq!(booking.docket, None);
        assert_eq!(booking.total, "341.00");
    }

    #[test]
    fn test_trailing_lines() {
        assert_eq!(
            kind("DUMP FEE 0.00 0.00 12.00"),
            LineKind::AdditionalCharge(ChargeLine {
                description: "DUMP FEE",
                price: "0.00",
                gst: "0.00",
                total: "12.00",
            })
        );
        assert_eq!(
            kind("Other Charge - Contamination 20.00 2.00 22.00"),
            LineKind::AdditionalCharge(ChargeLine {
                description: "Other Charge - Contamination",
                price: "20.00",
                gst: "2.00",
                total: "22.00",
            })
        );
        assert_eq!(kind("O/N: 55/1234-A"), LineKind::Docket("55/1234-A"));
        assert_eq!(kind("# 99812"), LineKind::Docket("99812"));
        assert_eq!(kind("2,340 LITRES"), LineKind::Tipping("2,340 LITRES"));
        assert_eq!(kind("GATE LOCKED"), LineKind::Remark("GATE LOCKED"));
    }

    #[test]
    fn test_noise_is_checked_first() {
        assert_eq!(kind("Page 2 Invoice No: 123"), LineKind::Noise);
        assert_eq!(kind(""), LineKind::Noise);
    }

    #[test]
    fn test_unclassified() {
        assert_eq!(kind("Thank you for your business"), LineKind::Unclassified);
        assert_eq!(matching_rule("Thank you for your business", &Lexicon::new()), None);
        assert_eq!(matching_rule("# 99812", &Lexicon::new()), Some("docket"));
    }

    #[test]
    fn test_rule_stages_are_ordered() {
        let stages: Vec<Stage> = RULES.iter().map(|r| r.stage).collect();
        let mut sorted = stages.clone();
        sorted.sort_by_key(|s| match s {
            Stage::Noise => 0,
            Stage::Context => 1,
            Stage::Booking => 2,
            Stage::Trailing => 3,
        });
        assert_eq!(stages, sorted);
    }
}
