// SPDX-License-Identifier: MIT OR Apache-2.0
//! Inspector settings.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file looked up in the working directory
pub const SETTINGS_FILE_NAME: &str = "actionflow.ron";

/// Output encoding for the descriptor dump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    /// Pretty RON
    #[default]
    Ron,
    /// Pretty JSON
    Json,
}

/// Inspector settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectSettings {
    /// Format version
    pub version: u32,
    /// Default tracing filter directive, overridden by `RUST_LOG`
    pub log_filter: String,
    /// Output encoding
    pub format: OutputFormat,
    /// Node type names to dump; empty dumps every built-in node
    pub nodes: Vec<String>,
}

impl Default for InspectSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            log_filter: "actionflow=info".to_string(),
            format: OutputFormat::Ron,
            nodes: Vec::new(),
        }
    }
}

impl InspectSettings {
    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Load settings from `path`, falling back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse settings from RON text
    pub fn from_ron(content: &str) -> Result<Self, SettingsError> {
        let settings: InspectSettings = ron::from_str(content)?;

        // Version check
        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(SettingsError::UnsupportedVersion(settings.version));
        }

        Ok(settings)
    }

    /// Serialize settings to pretty RON
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }
}

/// Error when loading settings or writing the dump
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed settings file
    #[error("Invalid settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// RON encoding failure
    #[error("RON encoding failed: {0}")]
    Ron(#[from] ron::Error),

    /// JSON encoding failure
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings written by a newer version
    #[error("Settings version {0} is newer than supported version {SETTINGS_FORMAT_VERSION}")]
    UnsupportedVersion(u32),

    /// Requested node type is not built in
    #[error("Unknown node type: {0}")]
    UnknownNode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_roundtrip() {
        let settings = InspectSettings {
            format: OutputFormat::Json,
            nodes: vec!["BT/Root".to_string()],
            ..InspectSettings::default()
        };
        let ron = settings.to_ron().unwrap();
        let loaded = InspectSettings::from_ron(&ron).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let loaded = InspectSettings::from_ron("(format: Json)").unwrap();
        assert_eq!(loaded.format, OutputFormat::Json);
        assert_eq!(loaded.version, SETTINGS_FORMAT_VERSION);
        assert!(loaded.nodes.is_empty());
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = InspectSettings::from_ron("(version: 99)").unwrap_err();
        assert!(matches!(err, SettingsError::UnsupportedVersion(99)));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings =
            InspectSettings::load_or_default(Path::new("does/not/exist.ron")).unwrap();
        assert_eq!(settings, InspectSettings::default());
    }
}
