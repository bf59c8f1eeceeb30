//! Studio configuration
//!
//! Loaded from TOML; every key is optional.
//!
//! ```toml
//! data_dir = "/var/lib/ndf"
//! pretty_json = false
//! log_filter = "ndf_graph=debug,info"
//! ```

use crate::error::{StudioError, StudioResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Studio configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Root of the filesystem store
    pub data_dir: PathBuf,
    /// Pretty-print stored JSON records
    pub pretty_json: bool,
    /// Tracing filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl StudioConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With data directory
    #[inline]
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// With JSON pretty-printing
    #[inline]
    #[must_use]
    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }

    /// With log filter
    #[inline]
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns [`StudioError::Config`] on malformed TOML or wrong value types.
    pub fn from_toml_str(text: &str) -> StudioResult<Self> {
        toml::from_str(text).map_err(|e| StudioError::config(e.to_string()))
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns [`StudioError::Config`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> StudioResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| StudioError::config(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("ndf-data"),
            pretty_json: true,
            log_filter: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_keys_use_defaults() {
        let config = StudioConfig::from_toml_str("pretty_json = false").unwrap();
        assert_eq!(config, StudioConfig::new().with_pretty_json(false));
    }

    #[test]
    fn empty_text_is_default() {
        assert_eq!(StudioConfig::from_toml_str("").unwrap(), StudioConfig::default());
    }

    #[test]
    fn wrong_type_is_config_error() {
        let err = StudioConfig::from_toml_str("pretty_json = \"yes\"").unwrap_err();
        assert!(matches!(err, StudioError::Config(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("studio.toml");
        std::fs::write(&path, "data_dir = \"/srv/ndf\"\nlog_filter = \"debug\"").unwrap();

        let config = StudioConfig::load(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/ndf"));
        assert_eq!(config.log_filter, "debug");
        assert!(config.pretty_json);
    }
}
