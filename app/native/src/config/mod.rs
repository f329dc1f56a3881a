//! Overlay configuration.
//!
//! Configuration is a flat JSON object with camelCase keys; every field has
//! a default, so a partial (or absent) file is fine. Values are validated at
//! load and again when the overlay runtime is constructed, since the timing
//! values parameterize timers that must be strictly positive.

use std::path::Path;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::modules::overlay::constants::{opacity, timing};

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    /// The config file is not valid JSON for [`OverlayConfig`].
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    /// A duration field is zero.
    #[error("{field} must be strictly positive")]
    NonPositiveDuration {
        /// The offending field, in config (camelCase) spelling.
        field: &'static str,
    },

    /// An opacity field is outside `0.0..=1.0`.
    #[error("{field} must be within 0.0..=1.0, got {value}")]
    AlphaOutOfRange {
        /// The offending field, in config (camelCase) spelling.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Tuning for the view-mode coordination runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayConfig {
    /// Quiescence window for mode-driven resize dispatch (ms).
    pub resize_debounce_ms: u64,

    /// How long without qualifying input before the window fades (ms).
    pub idle_delay_ms: u64,

    /// Upper bound on how long a transition stays marked in-flight (ms).
    pub transition_timeout_ms: u64,

    /// Window opacity while the user is active.
    pub active_alpha: f64,

    /// Window opacity after the idle delay elapses.
    pub idle_alpha: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            resize_debounce_ms: timing::RESIZE_DEBOUNCE_MS,
            idle_delay_ms: timing::IDLE_DELAY_MS,
            transition_timeout_ms: timing::TRANSITION_TIMEOUT_MS,
            active_alpha: opacity::ACTIVE_ALPHA,
            idle_alpha: opacity::IDLE_ALPHA,
        }
    }
}

impl OverlayConfig {
    /// Loads and validates configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or if
    /// any value fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a zero duration or an out-of-range alpha.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resize_debounce_ms == 0 {
            return Err(ConfigError::NonPositiveDuration { field: "resizeDebounceMs" });
        }
        if self.idle_delay_ms == 0 {
            return Err(ConfigError::NonPositiveDuration { field: "idleDelayMs" });
        }
        if self.transition_timeout_ms == 0 {
            return Err(ConfigError::NonPositiveDuration { field: "transitionTimeoutMs" });
        }
        for (field, value) in [
            ("activeAlpha", self.active_alpha),
            ("idleAlpha", self.idle_alpha),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::AlphaOutOfRange { field, value });
            }
        }
        Ok(())
    }

    /// The resize debounce window as a duration.
    #[must_use]
    pub const fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    /// The idle delay as a duration.
    #[must_use]
    pub const fn idle_delay(&self) -> Duration { Duration::from_millis(self.idle_delay_ms) }

    /// The transition timeout as a duration.
    #[must_use]
    pub const fn transition_timeout(&self) -> Duration {
        Duration::from_millis(self.transition_timeout_ms)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = OverlayConfig::default();
        config.validate().unwrap();

        assert_eq!(config.resize_debounce(), Duration::from_millis(150));
        assert_eq!(config.idle_delay(), Duration::from_millis(30_000));
    }

    #[test]
    fn test_zero_durations_are_rejected() {
        for field in ["resize_debounce_ms", "idle_delay_ms", "transition_timeout_ms"] {
            let mut config = OverlayConfig::default();
            match field {
                "resize_debounce_ms" => config.resize_debounce_ms = 0,
                "idle_delay_ms" => config.idle_delay_ms = 0,
                _ => config.transition_timeout_ms = 0,
            }
            assert!(
                matches!(config.validate(), Err(ConfigError::NonPositiveDuration { .. })),
                "{field} = 0 should fail validation"
            );
        }
    }

    #[test]
    fn test_out_of_range_alpha_is_rejected() {
        let config = OverlayConfig {
            idle_alpha: 1.5,
            ..OverlayConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::AlphaOutOfRange { field: "idleAlpha", .. }));

        let config = OverlayConfig {
            active_alpha: -0.1,
            ..OverlayConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_merges_with_defaults() {
        let config: OverlayConfig = serde_json::from_str(r#"{"idleDelayMs": 5000}"#).unwrap();
        assert_eq!(config.idle_delay_ms, 5_000);
        assert_eq!(config.resize_debounce_ms, timing::RESIZE_DEBOUNCE_MS);
    }

    #[test]
    fn test_camel_case_round_trip() {
        let config = OverlayConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("resizeDebounceMs"));
        assert!(json.contains("activeAlpha"));

        let parsed: OverlayConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
