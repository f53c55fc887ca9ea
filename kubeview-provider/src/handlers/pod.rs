use kubeview_core::{Artifact, Kind, KindHandler, Manifest, ManifestStatus, ManifestWarning};

use super::{container_warnings, image_artifacts};

/// Derives status from `status.phase`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PodHandler;

impl KindHandler for PodHandler {
    fn kind(&self) -> Kind {
        Kind::Pod
    }

    fn status(&self, manifest: &Manifest) -> ManifestStatus {
        let Some(phase) = manifest.status_str("phase") else {
            return ManifestStatus::stable().unstable("No status reported yet");
        };

        match phase {
            "Running" | "Succeeded" => ManifestStatus::stable(),
            "Pending" => ManifestStatus::stable()
                .unstable("Pod is pending")
                .unavailable("Pod is pending"),
            "Failed" => {
                let reason = manifest
                    .status_str("message")
                    .or_else(|| manifest.status_str("reason"))
                    .unwrap_or("Pod has failed");
                ManifestStatus::stable()
                    .unstable(reason)
                    .unavailable(reason)
                    .failed(reason)
            }
            other => ManifestStatus::stable()
                .unstable(format!("Pod phase is {}", other))
                .unavailable(format!("Pod phase is {}", other)),
        }
    }

    fn list_artifacts(&self, manifest: &Manifest) -> Vec<Artifact> {
        image_artifacts(manifest)
    }

    fn list_warnings(&self, manifest: &Manifest) -> Vec<ManifestWarning> {
        container_warnings(manifest)
    }
}
