// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor configuration.
//!
//! Stored as pretty-printed RON. Missing fields fall back to their defaults,
//! so older files keep loading as fields are added.

use serde::{Deserialize, Serialize};
use splice_timeline::{TimecodeFormat, TimelineSettings};
use std::path::Path;
use thiserror::Error;

use crate::history::MAX_HISTORY;
use crate::logging::DEFAULT_FILTER;

/// Current configuration format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "splice.ron";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Configuration could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// File was written by a newer version
    #[error("Config version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },
}

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Config format version
    pub version: u32,
    /// Maximum undo depth
    pub history_depth: usize,
    /// Settings for new timelines
    pub default_settings: TimelineSettings,
    /// How timecodes are displayed
    pub timecode_format: TimecodeFormat,
    /// Tracing filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            history_depth: MAX_HISTORY,
            default_settings: TimelineSettings::default(),
            timecode_format: TimecodeFormat::default(),
            log_filter: DEFAULT_FILTER.to_string(),
        }
    }
}

impl EditorConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: EditorConfig = ron::from_str(&content)?;

        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }

        tracing::info!(path = %path.display(), "Loaded editor config");
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        let content = ron::ser::to_string_pretty(self, pretty)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the config file path inside a directory
    pub fn file_path(dir: &Path) -> std::path::PathBuf {
        dir.join(CONFIG_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.version, CONFIG_FORMAT_VERSION);
        assert_eq!(config.history_depth, 100);
        assert_eq!(config.default_settings.frame_rate, 30.0);
        assert_eq!(config.default_settings.sample_rate, 48_000);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = EditorConfig::file_path(dir.path());

        let config = EditorConfig {
            history_depth: 25,
            timecode_format: TimecodeFormat::Milliseconds,
            ..EditorConfig::default()
        };
        config.save(&path).unwrap();

        let loaded = EditorConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.ron");
        std::fs::write(&path, "(history_depth: 7)").unwrap();

        let loaded = EditorConfig::load(&path).unwrap();
        assert_eq!(loaded.history_depth, 7);
        assert_eq!(loaded.log_filter, DEFAULT_FILTER);
    }

    #[test]
    fn test_rejects_newer_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.ron");
        std::fs::write(&path, "(version: 9)").unwrap();

        assert!(matches!(
            EditorConfig::load(&path),
            Err(ConfigError::UnsupportedVersion { found: 9, .. })
        ));
    }
}
