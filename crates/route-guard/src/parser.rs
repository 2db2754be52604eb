//! Configuration file parser.

use crate::error::{GuardError, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Supported configuration formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detects format from file extension.
    pub fn from_extension(path: &str) -> Option<Self> {
        if path.ends_with(".yaml") || path.ends_with(".yml") {
            Some(ConfigFormat::Yaml)
        } else if path.ends_with(".json") {
            Some(ConfigFormat::Json)
        } else {
            None
        }
    }

    /// Detects format from content.
    pub fn detect(content: &str) -> Self {
        let trimmed = content.trim();
        if trimmed.starts_with('{') {
            ConfigFormat::Json
        } else {
            ConfigFormat::Yaml
        }
    }
}

/// Parses a document, auto-detecting format.
pub fn parse_document<T: DeserializeOwned>(content: &str) -> Result<T> {
    parse_document_with_format(content, ConfigFormat::detect(content))
}

/// Parses a document with a known format.
pub fn parse_document_with_format<T: DeserializeOwned>(
    content: &str,
    format: ConfigFormat,
) -> Result<T> {
    match format {
        ConfigFormat::Yaml => Ok(serde_yaml::from_str(content)?),
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| GuardError::ParseError(e.to_string()))
        }
    }
}

/// Reads and parses a configuration file.
///
/// The extension picks the format; unknown extensions fall back to content
/// detection.
pub fn load_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| GuardError::ParseError(format!("{}: {}", path.display(), e)))?;

    let format = path
        .to_str()
        .and_then(ConfigFormat::from_extension)
        .unwrap_or_else(|| ConfigFormat::detect(&content));

    tracing::debug!(path = %path.display(), ?format, "loading guard configuration");
    parse_document_with_format(&content, format)
}
