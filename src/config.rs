//! @ai:module:intent Configuration for label vocabulary and chunking
//! @ai:module:layer infrastructure
//! @ai:module:public_api SylnerConfig, ChunkingConfig
//! @ai:module:depends_on label, error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::label::LabelSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// @ai:intent Top-level configuration, loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SylnerConfig {
    #[serde(default)]
    pub labels: LabelSet,
    #[serde(default)]
    pub chunking: ChunkingConfig,
}

/// @ai:intent How extracted text is prepared and split into chunks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default = "default_clean")]
    pub clean: bool,
}

impl Default for SylnerConfig {
    fn default() -> Self {
        Self {
            labels: LabelSet::default(),
            chunking: ChunkingConfig::default(),
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            clean: default_clean(),
        }
    }
}

fn default_separator() -> String {
    "\n".to_string()
}

fn default_clean() -> bool {
    true
}

impl SylnerConfig {
    /// @ai:intent Load and validate configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// @ai:intent Load from path when given, otherwise fall back to defaults
    /// @ai:effects fs:read
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| Error::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }

    /// @ai:intent Reject configurations the aligner cannot work with
    /// @ai:effects pure
    pub fn validate(&self) -> Result<()> {
        self.labels.validate()?;
        if self.chunking.separator.is_empty() {
            return Err(Error::Config("chunking.separator must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_save_and_load_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sylner.toml");
        SylnerConfig::default().save(&path).unwrap();
        assert_eq!(SylnerConfig::load(&path).unwrap(), SylnerConfig::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SylnerConfig = toml::from_str("labels = [\"DATE\", \"TIME\"]").unwrap();
        assert_eq!(config.labels.len(), 2);
        assert_eq!(config.chunking, ChunkingConfig::default());
    }

    #[test]
    fn test_load_rejects_invalid_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "labels = []\n").unwrap();
        assert!(matches!(SylnerConfig::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = SylnerConfig::load(Path::new("/nonexistent/sylner.toml"));
        assert!(matches!(result, Err(Error::FileRead { .. })));
    }

    #[test]
    fn test_load_or_default_without_path() {
        assert_eq!(
            SylnerConfig::load_or_default(None).unwrap(),
            SylnerConfig::default()
        );
    }
}
