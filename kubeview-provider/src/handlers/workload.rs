//! Handlers for replicated workloads.

use kubeview_core::{Artifact, Kind, KindHandler, Manifest, ManifestStatus, ManifestWarning};
use serde_json::Value;

use super::{container_warnings, image_artifacts};

/// `None` when the controller has caught up with the latest spec.
fn pending_generation(manifest: &Manifest) -> Option<ManifestStatus> {
    if manifest.status().is_none() {
        return Some(ManifestStatus::stable().unstable("No status reported yet"));
    }

    match (manifest.generation(), manifest.observed_generation()) {
        (Some(generation), Some(observed)) if observed < generation => Some(
            ManifestStatus::stable()
                .unstable("Waiting for status generation to match updated object generation"),
        ),
        _ => None,
    }
}

/// Desired replicas; Kubernetes defaults an unset `spec.replicas` to 1.
fn desired_replicas(manifest: &Manifest) -> i64 {
    manifest.spec_i64("replicas").unwrap_or(1)
}

fn status_count(manifest: &Manifest, field: &str) -> i64 {
    manifest.status_i64(field).unwrap_or(0)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DeploymentHandler;

impl DeploymentHandler {
    fn progress_deadline_exceeded(manifest: &Manifest) -> bool {
        manifest
            .status()
            .and_then(|status| status.get("conditions"))
            .and_then(Value::as_array)
            .is_some_and(|conditions| {
                conditions.iter().any(|condition| {
                    condition.get("type").and_then(Value::as_str) == Some("Progressing")
                        && condition.get("reason").and_then(Value::as_str)
                            == Some("ProgressDeadlineExceeded")
                })
            })
    }
}

impl KindHandler for DeploymentHandler {
    fn kind(&self) -> Kind {
        Kind::Deployment
    }

    fn status(&self, manifest: &Manifest) -> ManifestStatus {
        let mut status = ManifestStatus::stable();
        if manifest.spec_bool("paused") == Some(true) {
            status = status.paused("Deployment is paused");
        }
        if Self::progress_deadline_exceeded(manifest) {
            return status
                .unstable("Deployment exceeded its progress deadline")
                .failed("Deployment exceeded its progress deadline");
        }
        if let Some(pending) = pending_generation(manifest) {
            return ManifestStatus {
                paused: status.paused,
                ..pending
            };
        }

        let desired = desired_replicas(manifest);
        let updated = status_count(manifest, "updatedReplicas");
        let total = status_count(manifest, "replicas");
        let available = status_count(manifest, "availableReplicas");
        let ready = status_count(manifest, "readyReplicas");

        if available < desired {
            status = status.unavailable(format!("{}/{} replicas available", available, desired));
        }

        if updated < desired {
            status.unstable("Waiting for all replicas to be updated")
        } else if total > updated {
            status.unstable("Waiting for old replicas to finish termination")
        } else if available < desired {
            status.unstable("Waiting for all replicas to be available")
        } else if ready < desired {
            status.unstable("Waiting for all replicas to be ready")
        } else {
            status
        }
    }

    fn list_artifacts(&self, manifest: &Manifest) -> Vec<Artifact> {
        image_artifacts(manifest)
    }

    fn list_warnings(&self, manifest: &Manifest) -> Vec<ManifestWarning> {
        container_warnings(manifest)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReplicaSetHandler;

impl KindHandler for ReplicaSetHandler {
    fn kind(&self) -> Kind {
        Kind::ReplicaSet
    }

    fn status(&self, manifest: &Manifest) -> ManifestStatus {
        if let Some(pending) = pending_generation(manifest) {
            return pending;
        }

        let desired = desired_replicas(manifest);
        let labeled = status_count(manifest, "fullyLabeledReplicas");
        let available = status_count(manifest, "availableReplicas");
        let ready = status_count(manifest, "readyReplicas");

        let mut status = ManifestStatus::stable();
        if available < desired {
            status = status.unavailable(format!("{}/{} replicas available", available, desired));
        }

        if labeled < desired {
            status.unstable("Waiting for all replicas to be fully-labeled")
        } else if available < desired {
            status.unstable("Waiting for all replicas to be available")
        } else if ready < desired {
            status.unstable("Waiting for all replicas to be ready")
        } else {
            status
        }
    }

    fn list_artifacts(&self, manifest: &Manifest) -> Vec<Artifact> {
        image_artifacts(manifest)
    }

    fn list_warnings(&self, manifest: &Manifest) -> Vec<ManifestWarning> {
        container_warnings(manifest)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatefulSetHandler;

impl KindHandler for StatefulSetHandler {
    fn kind(&self) -> Kind {
        Kind::StatefulSet
    }

    fn status(&self, manifest: &Manifest) -> ManifestStatus {
        if let Some(pending) = pending_generation(manifest) {
            return pending;
        }

        let desired = desired_replicas(manifest);
        let ready = status_count(manifest, "readyReplicas");
        let updated = status_count(manifest, "updatedReplicas");
        let current_revision = manifest.status_str("currentRevision");
        let update_revision = manifest.status_str("updateRevision");

        let mut status = ManifestStatus::stable();
        if ready < desired {
            status = status.unavailable(format!("{}/{} replicas ready", ready, desired));
        }

        if ready < desired {
            status.unstable("Waiting for all replicas to be ready")
        } else if updated < desired {
            status.unstable("Waiting for all replicas to be updated")
        } else if current_revision != update_revision {
            status.unstable("Waiting for the rollout to reach the update revision")
        } else {
            status
        }
    }

    fn list_artifacts(&self, manifest: &Manifest) -> Vec<Artifact> {
        image_artifacts(manifest)
    }

    fn list_warnings(&self, manifest: &Manifest) -> Vec<ManifestWarning> {
        container_warnings(manifest)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DaemonSetHandler;

impl KindHandler for DaemonSetHandler {
    fn kind(&self) -> Kind {
        Kind::DaemonSet
    }

    fn status(&self, manifest: &Manifest) -> ManifestStatus {
        if let Some(pending) = pending_generation(manifest) {
            return pending;
        }

        let desired = status_count(manifest, "desiredNumberScheduled");
        let scheduled = status_count(manifest, "currentNumberScheduled");
        let updated = status_count(manifest, "updatedNumberScheduled");
        let available = status_count(manifest, "numberAvailable");
        let ready = status_count(manifest, "numberReady");

        let mut status = ManifestStatus::stable();
        if available < desired {
            status = status.unavailable(format!("{}/{} pods available", available, desired));
        }

        if scheduled < desired {
            status.unstable("Waiting for all pods to be scheduled")
        } else if updated < desired {
            status.unstable("Waiting for all pods to be updated")
        } else if available < desired {
            status.unstable("Waiting for all pods to be available")
        } else if ready < desired {
            status.unstable("Waiting for all pods to be ready")
        } else {
            status
        }
    }

    fn list_artifacts(&self, manifest: &Manifest) -> Vec<Artifact> {
        image_artifacts(manifest)
    }

    fn list_warnings(&self, manifest: &Manifest) -> Vec<ManifestWarning> {
        container_warnings(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest(value: Value) -> Manifest {
        Manifest::from_value(value).unwrap()
    }

    #[test]
    fn test_deployment_rolled_out_is_stable() {
        let deployment = manifest(json!({
            "metadata": { "generation": 2 },
            "spec": { "replicas": 2 },
            "status": {
                "observedGeneration": 2,
                "replicas": 2,
                "updatedReplicas": 2,
                "availableReplicas": 2,
                "readyReplicas": 2
            }
        }));
        let status = DeploymentHandler.status(&deployment);
        assert!(status.is_stable());
        assert!(status.available.state);
        assert!(!status.paused.state);
    }

    #[test]
    fn test_deployment_without_status_is_unstable() {
        let status = DeploymentHandler.status(&manifest(json!({ "spec": { "replicas": 1 } })));
        assert!(!status.is_stable());
        assert_eq!(status.stable.message.as_deref(), Some("No status reported yet"));
    }

    #[test]
    fn test_deployment_waiting_for_generation() {
        let deployment = manifest(json!({
            "metadata": { "generation": 3 },
            "spec": { "replicas": 1, "paused": true },
            "status": { "observedGeneration": 2 }
        }));
        let status = DeploymentHandler.status(&deployment);
        assert!(!status.is_stable());
        assert!(status.paused.state);
    }

    #[test]
    fn test_deployment_rolling_update_in_progress() {
        let deployment = manifest(json!({
            "spec": { "replicas": 3 },
            "status": {
                "replicas": 4,
                "updatedReplicas": 3,
                "availableReplicas": 3,
                "readyReplicas": 3
            }
        }));
        let status = DeploymentHandler.status(&deployment);
        assert_eq!(
            status.stable.message.as_deref(),
            Some("Waiting for old replicas to finish termination")
        );
        assert!(status.available.state);
    }

    #[test]
    fn test_deployment_progress_deadline_fails() {
        let deployment = manifest(json!({
            "spec": { "replicas": 1 },
            "status": {
                "conditions": [
                    { "type": "Progressing", "status": "False", "reason": "ProgressDeadlineExceeded" }
                ]
            }
        }));
        let status = DeploymentHandler.status(&deployment);
        assert!(status.failed.state);
        assert!(!status.is_stable());
    }

    #[test]
    fn test_replica_set_unavailable() {
        let replica_set = manifest(json!({
            "spec": { "replicas": 2 },
            "status": { "fullyLabeledReplicas": 2, "availableReplicas": 1, "readyReplicas": 1 }
        }));
        let status = ReplicaSetHandler.status(&replica_set);
        assert!(!status.is_stable());
        assert!(!status.available.state);
        assert_eq!(
            status.available.message.as_deref(),
            Some("1/2 replicas available")
        );
    }

    #[test]
    fn test_stateful_set_revision_mismatch() {
        let stateful_set = manifest(json!({
            "spec": { "replicas": 1 },
            "status": {
                "readyReplicas": 1,
                "updatedReplicas": 1,
                "currentRevision": "db-1",
                "updateRevision": "db-2"
            }
        }));
        let status = StatefulSetHandler.status(&stateful_set);
        assert!(!status.is_stable());
        assert!(status.available.state);
    }

    #[test]
    fn test_daemon_set_scheduled_everywhere() {
        let daemon_set = manifest(json!({
            "status": {
                "desiredNumberScheduled": 3,
                "currentNumberScheduled": 3,
                "updatedNumberScheduled": 3,
                "numberAvailable": 3,
                "numberReady": 3
            }
        }));
        assert!(DaemonSetHandler.status(&daemon_set).is_stable());
    }

    #[test]
    fn test_workload_artifacts_come_from_pod_template() {
        let deployment = manifest(json!({
            "spec": {
                "template": { "spec": { "containers": [{ "name": "app", "image": "app:1" }] } }
            }
        }));
        let artifacts = DeploymentHandler.list_artifacts(&deployment);
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].reference, "app:1");
    }
}
