//! Tracing subscriber initialization

use kubeview_core::{parse_flag, ConfigError, KubeviewResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable for [`TelemetryConfig::default_filter`].
pub const ENV_LOG_FILTER: &str = "KUBEVIEW_LOG";
/// Environment variable for [`TelemetryConfig::json`].
pub const ENV_LOG_JSON: &str = "KUBEVIEW_LOG_JSON";

const DEFAULT_FILTER: &str = "kubeview_provider=info,kubeview_cache=info,warn";

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Filter used when `RUST_LOG` is unset or invalid.
    pub default_filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            default_filter: DEFAULT_FILTER.to_string(),
            json: false,
        }
    }
}

impl TelemetryConfig {
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Create from environment variables with fallback to defaults.
    ///
    /// - `KUBEVIEW_LOG` (default: `kubeview_provider=info,kubeview_cache=info,warn`)
    /// - `KUBEVIEW_LOG_JSON` (default: false)
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] if `KUBEVIEW_LOG_JSON` is not a flag
    /// accepted by [`parse_flag`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let json = match lookup(ENV_LOG_JSON) {
            Some(value) => parse_flag(ENV_LOG_JSON, &value)?,
            None => defaults.json,
        };

        Ok(Self {
            default_filter: lookup(ENV_LOG_FILTER)
                .filter(|filter| !filter.trim().is_empty())
                .unwrap_or(defaults.default_filter),
            json,
        })
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over [`TelemetryConfig::default_filter`]. Call once at
/// startup; a second call fails with [`ConfigError::TelemetryInit`].
pub fn init_tracing(config: &TelemetryConfig) -> KubeviewResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if config.json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    result.map_err(|e| ConfigError::TelemetryInit {
        reason: e.to_string(),
    })?;

    tracing::info!(
        filter = %config.default_filter,
        json = config.json,
        "Tracing initialized"
    );

    Ok(())
}
