//! Built-in kind handlers.
//!
//! Workload and pod handlers derive status from the object's own status
//! block; config handlers expose the object as an artifact; everything else
//! uses [`GenericHandler`].

mod config;
mod generic;
mod pod;
mod workload;

pub use config::ConfigResourceHandler;
pub use generic::GenericHandler;
pub use pod::PodHandler;
pub use workload::{DaemonSetHandler, DeploymentHandler, ReplicaSetHandler, StatefulSetHandler};

use kubeview_core::{split_image_reference, Artifact, Manifest, ManifestWarning, WarningKind};

/// One `docker/image` artifact per distinct container image, in container order.
pub(crate) fn image_artifacts(manifest: &Manifest) -> Vec<Artifact> {
    let mut artifacts: Vec<Artifact> = Vec::new();
    for image in manifest
        .containers()
        .into_iter()
        .filter_map(|container| container.image)
    {
        if !artifacts.iter().any(|artifact| artifact.reference == image) {
            artifacts.push(Artifact::docker_image(&image));
        }
    }
    artifacts
}

/// Warnings for containers without limits or with unpinned images.
pub(crate) fn container_warnings(manifest: &Manifest) -> Vec<ManifestWarning> {
    let mut warnings = Vec::new();
    for container in manifest.containers() {
        if !container.has_limits() {
            warnings.push(ManifestWarning::new(
                WarningKind::MissingResourceLimits,
                format!("Container '{}' declares no resource limits", container.name),
            ));
        }

        if let Some(image) = container.image.as_deref() {
            let (_, version) = split_image_reference(image);
            if matches!(version, None | Some("latest")) {
                warnings.push(ManifestWarning::new(
                    WarningKind::UnpinnedImage,
                    format!(
                        "Container '{}' image '{}' is not pinned to a tag or digest",
                        container.name, image
                    ),
                ));
            }
        }
    }
    warnings
}
