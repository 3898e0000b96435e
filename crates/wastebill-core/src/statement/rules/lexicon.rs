//! Fixed vocabularies: page boilerplate markers and accepted remark phrases.

use crate::models::config::ParserConfig;

/// Substrings marking a line as page boilerplate (headers, banners, footers).
pub const NOISE_MARKERS: &[&str] = &[
    "A.B.N.",
    "Continued from previous page",
    "Transaction details continued",
    "Errors and Omissions",
    "Remittance Advice",
    "Page",
    "-F-",
    "INVOICE NUMBER",
];

/// Operational phrases kept as remarks when they start a line.
pub const REMARK_PHRASES: &[&str] = &[
    "BIN WAS EMPTY",
    "CLOSED",
    "GATE LOCKED",
    "BLOCKED ACCESS",
    "BIN LOCKED",
    "BIN NOT OUT",
    "BIN EMPTY",
    "TOO WET",
    "FLOODS",
    "ACCESS BLOCKED",
];

/// Phrase kept as a remark wherever it appears in a line.
pub const EXCESS_WEIGHT: &str = "EXCESS WEIGHT";

/// Noise markers and remark phrases in effect for a parser.
#[derive(Debug, Clone)]
pub struct Lexicon {
    noise_markers: Vec<String>,
    remark_phrases: Vec<String>,
}

impl Lexicon {
    /// Built-in vocabulary only.
    pub fn new() -> Self {
        Self {
            noise_markers: NOISE_MARKERS.iter().map(|s| s.to_string()).collect(),
            remark_phrases: REMARK_PHRASES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Built-in vocabulary plus the extras from the parser configuration.
    pub fn from_config(config: &ParserConfig) -> Self {
        let mut lexicon = Self::new();
        lexicon.noise_markers.extend(
            config
                .extra_noise_markers
                .iter()
                .filter(|m| !m.is_empty())
                .cloned(),
        );
        lexicon.remark_phrases.extend(
            config
                .extra_remark_phrases
                .iter()
                .filter(|p| !p.trim().is_empty())
                .map(|p| p.trim().to_uppercase()),
        );
        lexicon
    }

    /// Whether a normalized line is boilerplate.
    pub fn is_noise(&self, line: &str) -> bool {
        line.is_empty() || self.noise_markers.iter().any(|m| line.contains(m.as_str()))
    }

    /// Whether a normalized line is an accepted operational remark.
    pub fn is_remark(&self, line: &str) -> bool {
        let upper = line.to_uppercase();
        self.remark_phrases.iter().any(|p| upper.starts_with(p.as_str()))
            || upper.contains(EXCESS_WEIGHT)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_markers() {
        let lexicon = Lexicon::new();
        assert!(lexicon.is_noise(""));
        assert!(lexicon.is_noise("Page 3 of 10"));
        assert!(lexicon.is_noise("Transaction details continued on next page"));
        assert!(lexicon.is_noise("-F-"));
        assert!(!lexicon.is_noise("GATE LOCKED"));
    }

    #[test]
    fn test_remarks_are_case_insensitive_prefixes() {
        let lexicon = Lexicon::new();
        assert!(lexicon.is_remark("Gate locked at 6am"));
        assert!(lexicon.is_remark("BIN NOT OUT"));
        assert!(lexicon.is_remark("Driver noted excess weight"));
        assert!(!lexicon.is_remark("Driver says gate locked"));
        assert!(!lexicon.is_remark("THANK YOU FOR YOUR BUSINESS"));
    }

    #[test]
    fn test_config_extras() {
        let config = ParserConfig {
            extra_noise_markers: vec!["Tax Invoice".to_string()],
            extra_remark_phrases: vec![" no access ".to_string()],
            max_lines: 0,
        };
        let lexicon = Lexicon::from_config(&config);
        assert!(lexicon.is_noise("Tax Invoice"));
        assert!(lexicon.is_remark("No access - dog in yard"));
        assert!(lexicon.is_noise("Page 1"));
    }
}
