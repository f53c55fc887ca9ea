//! Resource kind discriminator

use crate::IdentityError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kubernetes resource kind.
///
/// Built-in kinds carry their scope (namespaced or cluster-wide). Anything
/// else must be group-qualified (`certificate.cert-manager.io`) and is
/// treated as a namespaced custom resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Kind {
    // Namespaced
    Deployment,
    ReplicaSet,
    StatefulSet,
    DaemonSet,
    Pod,
    Service,
    Ingress,
    ConfigMap,
    Secret,
    Job,
    CronJob,
    PersistentVolumeClaim,
    ServiceAccount,
    Event,
    // Cluster scoped
    Namespace,
    Node,
    PersistentVolume,
    StorageClass,
    ClusterRole,
    ClusterRoleBinding,
    CustomResourceDefinition,
    /// Group-qualified kind not in the built-in table.
    Custom(CustomKind),
}

/// Every built-in kind, in declaration order.
pub const BUILTIN_KINDS: [Kind; 21] = [
    Kind::Deployment,
    Kind::ReplicaSet,
    Kind::StatefulSet,
    Kind::DaemonSet,
    Kind::Pod,
    Kind::Service,
    Kind::Ingress,
    Kind::ConfigMap,
    Kind::Secret,
    Kind::Job,
    Kind::CronJob,
    Kind::PersistentVolumeClaim,
    Kind::ServiceAccount,
    Kind::Event,
    Kind::Namespace,
    Kind::Node,
    Kind::PersistentVolume,
    Kind::StorageClass,
    Kind::ClusterRole,
    Kind::ClusterRoleBinding,
    Kind::CustomResourceDefinition,
];

impl Kind {
    /// Canonical name, also used as the cache type namespace for the kind.
    pub fn as_str(&self) -> &str {
        match self {
            Kind::Deployment => "deployment",
            Kind::ReplicaSet => "replicaSet",
            Kind::StatefulSet => "statefulSet",
            Kind::DaemonSet => "daemonSet",
            Kind::Pod => "pod",
            Kind::Service => "service",
            Kind::Ingress => "ingress",
            Kind::ConfigMap => "configMap",
            Kind::Secret => "secret",
            Kind::Job => "job",
            Kind::CronJob => "cronJob",
            Kind::PersistentVolumeClaim => "persistentVolumeClaim",
            Kind::ServiceAccount => "serviceAccount",
            Kind::Event => "event",
            Kind::Namespace => "namespace",
            Kind::Node => "node",
            Kind::PersistentVolume => "persistentVolume",
            Kind::StorageClass => "storageClass",
            Kind::ClusterRole => "clusterRole",
            Kind::ClusterRoleBinding => "clusterRoleBinding",
            Kind::CustomResourceDefinition => "customResourceDefinition",
            Kind::Custom(custom) => custom.as_str(),
        }
    }

    /// Whether resources of this kind live inside a namespace.
    pub fn is_namespaced(&self) -> bool {
        !matches!(
            self,
            Kind::Namespace
                | Kind::Node
                | Kind::PersistentVolume
                | Kind::StorageClass
                | Kind::ClusterRole
                | Kind::ClusterRoleBinding
                | Kind::CustomResourceDefinition
        )
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Kind::Custom(_))
    }

    /// Parse a kind name. Built-in names match case-insensitively.
    pub fn parse(s: &str) -> Result<Self, IdentityError> {
        if s.is_empty() {
            return Err(IdentityError::UnknownKind {
                kind: s.to_string(),
            });
        }

        if let Some(kind) = BUILTIN_KINDS
            .iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
        {
            return Ok(kind.clone());
        }

        CustomKind::parse(s).map(Kind::Custom)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Kind {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Kind> for String {
    fn from(kind: Kind) -> Self {
        kind.as_str().to_string()
    }
}

/// A validated, lower-cased, group-qualified kind name.
///
/// Only constructible through [`CustomKind::parse`], so every instance
/// renders back to a string that parses to the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomKind(String);

impl CustomKind {
    /// Parse `<kind>.<group>`; segments are lower-case alphanumerics and `-`.
    pub fn parse(s: &str) -> Result<Self, IdentityError> {
        let normalized = s.to_ascii_lowercase();
        let unknown = || IdentityError::UnknownKind {
            kind: s.to_string(),
        };

        let segments: Vec<&str> = normalized.split('.').collect();
        let valid_segment = |segment: &&str| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        };

        if segments.len() < 2 || !segments.iter().all(valid_segment) {
            return Err(unknown());
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
