//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) yields a
//! working engine. Files are only read by the binaries; the engine itself receives
//! an [`EngineConfig`] value.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// What to emit when a step's math cannot be made valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Emit the repaired text even though it still fails validation.
    Repaired,
    /// Emit the text exactly as the generator produced it.
    Original,
    /// Emit a visible error sentinel in place of the math.
    #[default]
    Sentinel,
}

impl FromStr for FallbackPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "repaired" => Ok(FallbackPolicy::Repaired),
            "original" => Ok(FallbackPolicy::Original),
            "sentinel" => Ok(FallbackPolicy::Sentinel),
            other => Err(ConfigError::InvalidValue {
                key: "fallback".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Strip file-touching LaTeX commands and unsafe MathML before processing.
    pub sanitize: bool,
    /// Run the presentation-MathML grammar checks in addition to the XML parse.
    pub grammar_checks: bool,
    pub fallback: FallbackPolicy,
    /// Expressions longer than this (in characters) get an `other` diagnostic.
    pub max_expression_length: usize,
    /// Commands to accept in addition to the built-in vocabulary.
    pub extra_commands: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sanitize: true,
            grammar_checks: true,
            fallback: FallbackPolicy::default(),
            max_expression_length: 1000,
            extra_commands: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn is_known_command(&self, name: &str) -> bool {
        self.extra_commands
            .iter()
            .any(|c| c.trim_start_matches('\\') == name)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.fallback, FallbackPolicy::Sentinel);
    }

    #[test]
    fn test_partial_override() {
        let config =
            EngineConfig::from_json(r#"{"fallback": "original", "extra_commands": ["\\vec"]}"#)
                .unwrap();
        assert_eq!(config.fallback, FallbackPolicy::Original);
        assert!(config.sanitize);
        assert!(config.is_known_command("vec"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = EngineConfig::load(Path::new("/nonexistent/mathboard.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_fallback_from_str() {
        assert_eq!("Repaired".parse::<FallbackPolicy>().unwrap(), FallbackPolicy::Repaired);
        assert!("loud".parse::<FallbackPolicy>().is_err());
    }
}
