//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod output;
pub mod process;

use std::fs;
use std::path::Path;

use tracing::debug;

use wastebill_core::models::config::WastebillConfig;
use wastebill_core::{ParsedDocument, Pipeline};

/// Load the configuration: explicit path, then the user config file, then defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<WastebillConfig> {
    if let Some(path) = config_path {
        return Ok(WastebillConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config from {}", default_path.display());
        return Ok(WastebillConfig::from_file(&default_path)?);
    }

    Ok(WastebillConfig::default())
}

/// Build the extraction pipeline from the loaded configuration.
pub fn load_pipeline(config_path: Option<&str>) -> anyhow::Result<Pipeline> {
    Ok(Pipeline::new(load_config(config_path)?)?)
}

/// Parse an input file: `.pdf` through text extraction, `.txt` as
/// pre-extracted text with form-feed page breaks.
pub fn parse_file(path: &Path, pipeline: &Pipeline) -> anyhow::Result<ParsedDocument> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let document = match extension.as_str() {
        "pdf" => pipeline.parse_pdf(&fs::read(path)?)?,
        "txt" => pipeline.parse_text(&fs::read_to_string(path)?)?,
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    };

    debug!(
        "{}: {} records from {} pages",
        path.display(),
        document.records.len(),
        document.stats.pages
    );
    Ok(document)
}

/// Whether a path has an extension `parse_file` understands.
pub fn is_supported(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    matches!(ext.to_lowercase().as_str(), "pdf" | "txt")
}
