use crate::error::ConfigError;
use crate::metrics::{DEFAULT_MAX_ENTRIES, DEFAULT_MAX_SESSIONS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tuning knobs for the specification generator.
///
/// Every field has a default, so a partial JSON file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Attempts made before a widget-mode generation is reported as failed.
    pub max_retries: u32,
    /// Deadline for a single model call, in milliseconds.
    pub attempt_timeout_ms: u64,
    /// Append the previous attempt's violations to the next prompt.
    pub feedback_violations: bool,
    /// Base delay between attempts, in milliseconds. Zero disables backoff.
    pub retry_backoff_ms: u64,
    pub metrics_max_sessions: usize,
    pub metrics_max_entries: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            attempt_timeout_ms: 60_000,
            feedback_violations: false,
            retry_backoff_ms: 0,
            metrics_max_sessions: DEFAULT_MAX_SESSIONS,
            metrics_max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl GeneratorConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid(
                "max_retries must be at least 1".to_string(),
            ));
        }
        if self.attempt_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "attempt_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Option<Duration> {
        (self.retry_backoff_ms > 0).then(|| Duration::from_millis(self.retry_backoff_ms))
    }
}
