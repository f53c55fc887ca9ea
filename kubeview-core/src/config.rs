//! Configuration types

use crate::ConfigError;
use serde::{Deserialize, Serialize};

/// Environment variable for [`ProviderConfig::concurrent_lookups`].
pub const ENV_CONCURRENT_LOOKUPS: &str = "KUBEVIEW_CONCURRENT_LOOKUPS";
/// Environment variable for [`ProviderConfig::include_events`].
pub const ENV_INCLUDE_EVENTS: &str = "KUBEVIEW_INCLUDE_EVENTS";
/// Environment variable for [`ProviderConfig::include_metrics`].
pub const ENV_INCLUDE_METRICS: &str = "KUBEVIEW_INCLUDE_METRICS";

/// Manifest provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Issue the event traversal and the metric lookup concurrently.
    pub concurrent_lookups: bool,
    /// Traverse event relationships. When off, views carry no events.
    pub include_events: bool,
    /// Look up metrics. When off, views carry no metrics.
    pub include_metrics: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            concurrent_lookups: true,
            include_events: true,
            include_metrics: true,
        }
    }
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrent_lookups(mut self, enabled: bool) -> Self {
        self.concurrent_lookups = enabled;
        self
    }

    pub fn with_events(mut self, enabled: bool) -> Self {
        self.include_events = enabled;
        self
    }

    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.include_metrics = enabled;
        self
    }

    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `KUBEVIEW_CONCURRENT_LOOKUPS` (default: true)
    /// - `KUBEVIEW_INCLUDE_EVENTS` (default: true)
    /// - `KUBEVIEW_INCLUDE_METRICS` (default: true)
    ///
    /// Accepts `true`/`false`/`1`/`0`; anything else is a [`ConfigError`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ProviderConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| match lookup(key) {
            Some(value) => parse_flag(key, &value),
            None => Ok(default),
        };

        Ok(Self {
            concurrent_lookups: flag(ENV_CONCURRENT_LOOKUPS, defaults.concurrent_lookups)?,
            include_events: flag(ENV_INCLUDE_EVENTS, defaults.include_events)?,
            include_metrics: flag(ENV_INCLUDE_METRICS, defaults.include_metrics)?,
        })
    }
}

/// Parse a boolean setting: `true`, `false`, `1` or `0`, case-insensitive.
///
/// `field` names the setting in the error.
pub fn parse_flag(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "expected true, false, 1 or 0".to_string(),
        }),
    }
}
