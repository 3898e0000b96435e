//! Configuration structures for the extraction pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WastebillError};

/// Main configuration for the wastebill pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WastebillConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Statement line parser configuration.
    pub parser: ParserConfig,

    /// Invoice reconciliation configuration.
    pub reconcile: ReconcileConfig,

    /// Export configuration.
    pub export: ExportConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to read (0 = unlimited).
    pub max_pages: usize,
}

/// Statement line parser configuration.
///
/// The built-in noise markers and remark phrases always apply; the lists here
/// only add to them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Extra substrings that mark a line as page boilerplate.
    pub extra_noise_markers: Vec<String>,

    /// Extra operational phrases accepted as remarks (matched as prefixes of
    /// the uppercased line).
    pub extra_remark_phrases: Vec<String>,

    /// Maximum number of lines per document (0 = unlimited).
    pub max_lines: usize,
}

/// Invoice reconciliation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Largest difference (exclusive) still treated as a match.
    pub tolerance: Decimal,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            tolerance: Decimal::new(1, 2),
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output filename prefix.
    pub filename_prefix: String,

    /// Month placeholder used when the issue date is missing or unreadable.
    pub unknown_month: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename_prefix: "JJ_RICHARDS".to_string(),
            unknown_month: "UNKNOWN_MONTH".to_string(),
        }
    }
}

impl WastebillConfig {
    /// Reject settings no document could be processed with.
    pub fn validate(&self) -> Result<()> {
        if self.reconcile.tolerance.is_sign_negative() {
            return Err(WastebillError::Config(format!(
                "reconcile.tolerance must not be negative (got {})",
                self.reconcile.tolerance
            )));
        }
        if self.export.filename_prefix.trim().is_empty() {
            return Err(WastebillError::Config(
                "export.filename_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> std::result::Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
