//! Processor configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_section_title() -> String {
    "Uncategorized".to_string()
}

fn default_legacy_notice() -> String {
    "Note: .doc files cannot be processed directly. Please convert the file to .docx and upload it again."
        .to_string()
}

fn default_unknown_notice() -> String {
    "Note: this file type is not supported, so no content could be extracted.".to_string()
}

fn default_accepted_extensions() -> Vec<String> {
    ["txt", "pdf", "doc", "docx"].iter().map(|s| s.to_string()).collect()
}

fn default_mmap_threshold() -> u64 {
    10 * 1024 * 1024
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessorConfig {
    /// Title of the synthesized level-0 section.
    #[serde(default = "default_section_title")]
    pub default_section_title: String,

    /// Diagnostic text stored for legacy `.doc` uploads.
    #[serde(default = "default_legacy_notice")]
    pub legacy_notice: String,

    /// Diagnostic text stored for unrecognised formats.
    #[serde(default = "default_unknown_notice")]
    pub unknown_notice: String,

    /// Extensions (without the dot) the batch walker picks up.
    #[serde(default = "default_accepted_extensions")]
    pub accepted_extensions: Vec<String>,

    /// Inputs larger than this are memory-mapped instead of read.
    #[serde(default = "default_mmap_threshold")]
    pub mmap_threshold_bytes: u64,

    /// Batch worker threads; 0 uses rayon's default.
    #[serde(default)]
    pub batch_workers: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            default_section_title: default_section_title(),
            legacy_notice: default_legacy_notice(),
            unknown_notice: default_unknown_notice(),
            accepted_extensions: default_accepted_extensions(),
            mmap_threshold_bytes: default_mmap_threshold(),
            batch_workers: 0,
        }
    }
}

impl ProcessorConfig {
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_section_title.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_section_title must not be empty".into(),
            ));
        }
        if self.legacy_notice.trim().is_empty() || self.unknown_notice.trim().is_empty() {
            return Err(ConfigError::Invalid("diagnostic notices must not be empty".into()));
        }
        if let Some(ext) = self
            .accepted_extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.starts_with('.'))
        {
            return Err(ConfigError::Invalid(format!(
                "accepted extension `{}` must be non-empty and given without a leading dot",
                ext
            )));
        }
        Ok(())
    }

    /// Whether the batch walker should pick up a file with this extension.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.accepted_extensions
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(ext))
    }
}
