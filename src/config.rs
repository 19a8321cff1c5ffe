//! Machine configuration
//!
//! Hosts either build a [`VmConfig`] directly or load one from TOML:
//!
//! ```toml
//! capacity = 30000
//! pointer_policy = "clamp"
//! cell_policy = "wrap"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::tape::{CellPolicy, PointerPolicy};
use crate::DEFAULT_CAPACITY;

/// Errors produced while building or loading a configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Memory capacity must be at least 1 cell")]
    ZeroCapacity,

    #[error("Unknown {kind} policy: {value}")]
    UnknownPolicy { kind: &'static str, value: String },

    #[error("Failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid config: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    #[serde(default)]
    pub pointer_policy: PointerPolicy,

    #[serde(default)]
    pub cell_policy: CellPolicy,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            pointer_policy: PointerPolicy::default(),
            cell_policy: CellPolicy::default(),
        }
    }
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl VmConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: VmConfig = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VmConfig::default();
        assert_eq!(config.capacity, 30000);
        assert_eq!(config.pointer_policy, PointerPolicy::Clamp);
        assert_eq!(config.cell_policy, CellPolicy::Wrap);
    }

    #[test]
    fn test_parse_full_document() {
        let config = VmConfig::from_toml_str(
            r#"
capacity = 64
pointer_policy = "wrap"
cell_policy = "unlimited"
"#,
        )
        .unwrap();

        assert_eq!(config.capacity, 64);
        assert_eq!(config.pointer_policy, PointerPolicy::Wrap);
        assert_eq!(config.cell_policy, CellPolicy::Unlimited);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = VmConfig::from_toml_str("cell_policy = \"error\"").unwrap();
        assert_eq!(config.capacity, 30000);
        assert_eq!(config.pointer_policy, PointerPolicy::Clamp);
        assert_eq!(config.cell_policy, CellPolicy::Error);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = VmConfig::from_toml_str("capacity = 0").unwrap_err();
        assert_eq!(err, ConfigError::ZeroCapacity);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let err = VmConfig::from_toml_str("pointer_policy = \"bounce\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = VmConfig::load(Path::new("/nonexistent/tapevm.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
