//! File-based configuration loading.

use std::path::Path;

use super::AutomationConfig;
use crate::error::{ExpectError, Result};

/// Configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Detect format from path.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Configuration file loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    default_format: Option<ConfigFormat>,
}

impl ConfigLoader {
    /// Create a new loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format used when the file extension is not recognised.
    #[must_use]
    pub const fn with_format(mut self, format: ConfigFormat) -> Self {
        self.default_format = Some(format);
        self
    }

    /// Load and validate a config file.
    ///
    /// Missing keys fall back to their defaults, so a file only needs to list
    /// what differs for its environment.
    pub fn load(&self, path: &Path) -> Result<AutomationConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ExpectError::config(format!("cannot read {}: {e}", path.display())))?;

        let format = ConfigFormat::from_path(path)
            .or(self.default_format)
            .ok_or_else(|| {
                ExpectError::config(format!("unknown config format: {}", path.display()))
            })?;

        let config = parse_config(&content, format)?;
        config.validate()?;
        Ok(config)
    }
}

/// Parse configuration text in the given format.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<AutomationConfig> {
    match format {
        ConfigFormat::Toml => toml::from_str(content)
            .map_err(|e| ExpectError::config(format!("TOML parse error: {e}"))),
        ConfigFormat::Json => serde_json::from_str(content)
            .map_err(|e| ExpectError::config(format!("JSON parse error: {e}"))),
    }
}
