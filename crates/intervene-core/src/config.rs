//! Coordinator configuration
//!
//! Every coordinator owns its own copy; nothing here is global.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Fewest suggestions a batch may carry
pub const MIN_SUGGESTIONS: usize = 3;

/// Most suggestions a batch may carry
pub const MAX_SUGGESTIONS: usize = 5;

/// Coordinator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatorConfig {
    /// Wall-clock budget for one decision round, in milliseconds
    pub decision_timeout_ms: u64,
    /// How many invalid decisions are re-requested before forcing ABORT
    pub max_invalid_decisions: u32,
    /// Whether suggestions are generated at all
    pub enable_suggestions: bool,
    /// Upper bound on suggestions per batch (clamped to 3..=5)
    pub max_suggestions: usize,
}

impl CoordinatorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With decision timeout, rounded down to whole milliseconds
    ///
    /// Never below 1 ms, the smallest value [`validate`](Self::validate)
    /// accepts.
    #[inline]
    #[must_use]
    pub fn with_decision_timeout(mut self, timeout: Duration) -> Self {
        self.decision_timeout_ms = u64::try_from(timeout.as_millis())
            .unwrap_or(u64::MAX)
            .max(1);
        self
    }

    /// With invalid-decision retry bound
    #[inline]
    #[must_use]
    pub fn with_max_invalid_decisions(mut self, bound: u32) -> Self {
        self.max_invalid_decisions = bound;
        self
    }

    /// With suggestion toggle
    #[inline]
    #[must_use]
    pub fn with_suggestions(mut self, enabled: bool) -> Self {
        self.enable_suggestions = enabled;
        self
    }

    /// With suggestion cap
    #[inline]
    #[must_use]
    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = max;
        self
    }

    /// Decision timeout as a duration
    #[inline]
    #[must_use]
    pub fn decision_timeout(&self) -> Duration {
        Duration::from_millis(self.decision_timeout_ms)
    }

    /// Effective suggestion cap
    #[inline]
    #[must_use]
    pub fn suggestion_limit(&self) -> usize {
        self.max_suggestions.clamp(MIN_SUGGESTIONS, MAX_SUGGESTIONS)
    }

    /// Parse from TOML
    ///
    /// # Errors
    /// `ConfigError::Parse` on malformed TOML or unknown keys,
    /// `ConfigError::Invalid` on out-of-range values.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// See [`CoordinatorConfig::from_toml_str`]; also `ConfigError::Io`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decision_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "decision_timeout_ms",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            decision_timeout_ms: 300_000,
            max_invalid_decisions: 1,
            enable_suggestions: true,
            max_suggestions: MAX_SUGGESTIONS,
        }
    }
}
