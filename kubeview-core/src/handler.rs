//! Kind-specific interpretation of manifests

use crate::{Artifact, Kind, Manifest, ManifestStatus, ManifestWarning};

/// Capability that interprets manifests of one kind.
///
/// Implementations are registered per kind (optionally per account) and
/// resolved for every request. Each method must accept any well-formed
/// manifest of the handled kind without panicking; missing fields fall back
/// to the defaults below.
pub trait KindHandler: Send + Sync {
    /// The kind this handler interprets.
    fn kind(&self) -> Kind;

    fn status(&self, _manifest: &Manifest) -> ManifestStatus {
        ManifestStatus::default()
    }

    fn list_artifacts(&self, _manifest: &Manifest) -> Vec<Artifact> {
        Vec::new()
    }

    fn list_warnings(&self, _manifest: &Manifest) -> Vec<ManifestWarning> {
        Vec::new()
    }
}
