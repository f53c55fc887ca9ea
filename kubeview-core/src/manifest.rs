//! Typed access to cached Kubernetes manifests

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A Kubernetes object as stored in the cache.
///
/// The payload stays a JSON object so that kinds unknown to this crate
/// survive untouched; the accessors cover the fields handlers interpret.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(Map<String, Value>);

impl Manifest {
    pub fn new(object: Map<String, Value>) -> Self {
        Self(object)
    }

    /// Wrap a JSON value, returning `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(object) => Some(Self(object)),
            _ => None,
        }
    }

    pub fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Look up a nested field by path segments, e.g. `["spec", "replicas"]`.
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.0.get(*first)?, |value, segment| value.get(*segment))
    }

    fn lookup_str(&self, path: &[&str]) -> Option<&str> {
        self.lookup(path).and_then(Value::as_str)
    }

    fn lookup_i64(&self, path: &[&str]) -> Option<i64> {
        self.lookup(path).and_then(Value::as_i64)
    }

    pub fn api_version(&self) -> Option<&str> {
        self.lookup_str(&["apiVersion"])
    }

    /// The `kind` field as written in the object.
    pub fn kind_name(&self) -> Option<&str> {
        self.lookup_str(&["kind"])
    }

    pub fn name(&self) -> Option<&str> {
        self.lookup_str(&["metadata", "name"])
    }

    pub fn namespace(&self) -> Option<&str> {
        self.lookup_str(&["metadata", "namespace"])
    }

    pub fn generation(&self) -> Option<i64> {
        self.lookup_i64(&["metadata", "generation"])
    }

    pub fn observed_generation(&self) -> Option<i64> {
        self.lookup_i64(&["status", "observedGeneration"])
    }

    pub fn spec(&self) -> Option<&Map<String, Value>> {
        self.lookup(&["spec"]).and_then(Value::as_object)
    }

    pub fn status(&self) -> Option<&Map<String, Value>> {
        self.lookup(&["status"]).and_then(Value::as_object)
    }

    /// Integer field under `spec`.
    pub fn spec_i64(&self, field: &str) -> Option<i64> {
        self.lookup_i64(&["spec", field])
    }

    /// Integer field under `status`.
    pub fn status_i64(&self, field: &str) -> Option<i64> {
        self.lookup_i64(&["status", field])
    }

    /// String field under `status`.
    pub fn status_str(&self, field: &str) -> Option<&str> {
        self.lookup_str(&["status", field])
    }

    pub fn spec_bool(&self, field: &str) -> Option<bool> {
        self.lookup(&["spec", field]).and_then(Value::as_bool)
    }

    /// Containers of a pod (`spec.containers`) or of a workload's pod
    /// template (`spec.template.spec.containers`).
    ///
    /// Entries that do not decode as a container are skipped.
    pub fn containers(&self) -> Vec<Container> {
        let containers = self
            .lookup(&["spec", "template", "spec", "containers"])
            .or_else(|| self.lookup(&["spec", "containers"]));

        containers
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl From<Map<String, Value>> for Manifest {
    fn from(object: Map<String, Value>) -> Self {
        Self(object)
    }
}

/// The subset of a container spec that handlers interpret.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub resources: Option<ResourceRequirements>,
}

impl Container {
    pub fn has_limits(&self) -> bool {
        self.resources
            .as_ref()
            .and_then(|resources| resources.limits.as_ref())
            .is_some_and(|limits| !limits.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceRequirements {
    #[serde(default)]
    pub limits: Option<Map<String, Value>>,
    #[serde(default)]
    pub requests: Option<Map<String, Value>>,
}

/// Ownership label attached to a cached resource.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Moniker {
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub cluster: Option<String>,
    #[serde(default)]
    pub stack: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub sequence: Option<i32>,
}

impl Moniker {
    pub fn new(app: impl Into<String>, cluster: impl Into<String>) -> Self {
        Self {
            app: Some(app.into()),
            cluster: Some(cluster.into()),
            ..Self::default()
        }
    }
}
