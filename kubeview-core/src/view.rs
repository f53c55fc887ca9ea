//! The assembled manifest view and the handler-derived parts of it

use crate::{EventRecord, Manifest, MetricRecord, Moniker};
use serde::{Deserialize, Serialize};

// ============================================================================
// STATUS
// ============================================================================

/// One status condition and an optional human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Condition {
    pub state: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Condition {
    pub fn yes() -> Self {
        Self {
            state: true,
            message: None,
        }
    }

    pub fn no() -> Self {
        Self {
            state: false,
            message: None,
        }
    }

    pub fn with_message(state: bool, message: impl Into<String>) -> Self {
        Self {
            state,
            message: Some(message.into()),
        }
    }
}

/// Handler-derived status of a resource.
///
/// The default is a stable, available, unpaused, non-failed resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ManifestStatus {
    pub stable: Condition,
    pub paused: Condition,
    pub available: Condition,
    pub failed: Condition,
}

impl Default for ManifestStatus {
    fn default() -> Self {
        Self {
            stable: Condition::yes(),
            paused: Condition::no(),
            available: Condition::yes(),
            failed: Condition::no(),
        }
    }
}

impl ManifestStatus {
    pub fn stable() -> Self {
        Self::default()
    }

    /// Mark the resource as still converging.
    pub fn unstable(mut self, message: impl Into<String>) -> Self {
        self.stable = Condition::with_message(false, message);
        self
    }

    pub fn paused(mut self, message: impl Into<String>) -> Self {
        self.paused = Condition::with_message(true, message);
        self
    }

    pub fn unavailable(mut self, message: impl Into<String>) -> Self {
        self.available = Condition::with_message(false, message);
        self
    }

    pub fn failed(mut self, message: impl Into<String>) -> Self {
        self.failed = Condition::with_message(true, message);
        self
    }

    pub fn is_stable(&self) -> bool {
        self.stable.state
    }
}

// ============================================================================
// ARTIFACTS
// ============================================================================

/// Artifact type for container images.
pub const DOCKER_IMAGE_ARTIFACT: &str = "docker/image";

/// An artifact a resource references or is itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Artifact {
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub name: String,
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Artifact {
    /// A container image reference such as `gcr.io/app:1.2` or `nginx@sha256:...`.
    ///
    /// `name` is the repository and `version` the tag or digest, if any.
    pub fn docker_image(image: &str) -> Self {
        let (name, version) = split_image_reference(image);
        Self {
            artifact_type: DOCKER_IMAGE_ARTIFACT.to_string(),
            name: name.to_string(),
            reference: image.to_string(),
            location: None,
            version: version.map(str::to_string),
        }
    }

    /// The Kubernetes object itself, as `kubernetes/<kind>`.
    pub fn kubernetes(kind: &str, name: &str, namespace: Option<&str>) -> Self {
        Self {
            artifact_type: format!("kubernetes/{}", kind),
            name: name.to_string(),
            reference: name.to_string(),
            location: namespace.filter(|ns| !ns.is_empty()).map(str::to_string),
            version: None,
        }
    }
}

/// Split an image reference into repository and tag/digest.
///
/// A `:` only counts as a tag separator after the last `/`, so registry
/// ports (`localhost:5000/app`) are not mistaken for tags.
pub fn split_image_reference(image: &str) -> (&str, Option<&str>) {
    if let Some((name, digest)) = image.split_once('@') {
        return (name, Some(digest));
    }

    let last_segment_start = image.rfind('/').map(|idx| idx + 1).unwrap_or(0);
    match image[last_segment_start..].rfind(':') {
        Some(idx) => {
            let split = last_segment_start + idx;
            (&image[..split], Some(&image[split + 1..]))
        }
        None => (image, None),
    }
}

// ============================================================================
// WARNINGS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum WarningKind {
    /// A container declares no resource limits.
    MissingResourceLimits,
    /// A container image has no tag or uses `latest`.
    UnpinnedImage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ManifestWarning {
    pub kind: WarningKind,
    pub message: String,
}

impl ManifestWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

// ============================================================================
// VIEW
// ============================================================================

/// Everything known about one resource, assembled from the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ManifestView {
    pub account: String,
    pub location: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub manifest: Manifest,
    pub moniker: Moniker,
    pub status: ManifestStatus,
    pub artifacts: Vec<Artifact>,
    /// Sorted ascending by display timestamp.
    pub events: Vec<EventRecord>,
    pub warnings: Vec<ManifestWarning>,
    pub metrics: Vec<MetricRecord>,
}
