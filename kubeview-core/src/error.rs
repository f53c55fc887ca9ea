//! Error types for KUBEVIEW operations

use thiserror::Error;

/// Errors decoding a caller-supplied resource name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Expected a full resource name of the form <kind>/<name>, got '{input}'")]
    Malformed { input: String },

    #[error("Unrecognized kind: '{kind}'")]
    UnknownKind { kind: String },

    #[error("Invalid resource name '{name}': {reason}")]
    InvalidName { name: String, reason: String },
}

/// Errors converting a raw cache record into a typed record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Cache record {key} is missing attribute '{attribute}'")]
    MissingAttribute { key: String, attribute: String },

    #[error("Cache record {key} has an invalid '{attribute}' attribute: {reason}")]
    InvalidAttribute {
        key: String,
        attribute: String,
        reason: String,
    },
}

/// Failures reported by the cache collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Lookup of {key} in {type_namespace} failed: {reason}")]
    LookupFailed {
        type_namespace: String,
        key: String,
        reason: String,
    },

    #[error("Cache lock poisoned")]
    LockPoisoned,
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to initialize tracing: {reason}")]
    TelemetryInit { reason: String },
}

/// Master error type for all KUBEVIEW errors.
#[derive(Debug, Clone, Error)]
pub enum KubeviewError {
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for KUBEVIEW operations.
pub type KubeviewResult<T> = Result<T, KubeviewError>;

// =============================================================================
// TESTS
// =============================================================================
