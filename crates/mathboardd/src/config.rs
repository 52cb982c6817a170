use mathboard_core::{ConfigError, EngineConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const STEP_DELAY_ENV: &str = "MATHBOARD_STEP_DELAY_MS";
pub const FALLBACK_ENV: &str = "MATHBOARD_FALLBACK";

/// Relay settings. Engine settings live at the same level of the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Pause between two emitted steps of one request.
    pub step_delay_ms: u64,
    #[serde(flatten)]
    pub engine: EngineConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: 1000,
            engine: EngineConfig::default(),
        }
    }
}

impl RelayConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    /// Applies `MATHBOARD_STEP_DELAY_MS` and `MATHBOARD_FALLBACK` from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(STEP_DELAY_ENV) {
            self.step_delay_ms = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: STEP_DELAY_ENV.to_string(),
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(FALLBACK_ENV) {
            self.engine.fallback = value.parse()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathboard_core::FallbackPolicy;

    #[test]
    fn test_flat_file_layout() {
        let config: RelayConfig =
            serde_json::from_str(r#"{"step_delay_ms": 10, "fallback": "original"}"#).unwrap();
        assert_eq!(config.step_delay(), Duration::from_millis(10));
        assert_eq!(config.engine.fallback, FallbackPolicy::Original);
        assert!(config.engine.sanitize);
    }

    #[test]
    fn test_overrides() {
        let mut config = RelayConfig::default();
        config
            .apply_overrides(|key| match key {
                STEP_DELAY_ENV => Some("250".to_string()),
                FALLBACK_ENV => Some("repaired".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.step_delay_ms, 250);
        assert_eq!(config.engine.fallback, FallbackPolicy::Repaired);
    }

    #[test]
    fn test_bad_override_is_an_error() {
        let mut config = RelayConfig::default();
        let err = config
            .apply_overrides(|key| (key == STEP_DELAY_ENV).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_missing_file() {
        assert!(RelayConfig::load(Path::new("/nonexistent/relay.json")).is_err());
    }
}
