//! Raw cache records as handed out by the cache.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// An untyped cache entry: attributes plus outgoing relationship edges.
///
/// Relationships are keyed by the target type namespace (`event`, `pod`, ...)
/// and hold the keys of related records in that namespace.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CacheRecord {
    pub id: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub relationships: BTreeMap<String, BTreeSet<String>>,
}

impl CacheRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn with_relationship(
        mut self,
        target_namespace: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        self.relate(target_namespace, key);
        self
    }

    /// Add an edge; returns `false` if it already existed.
    pub fn relate(&mut self, target_namespace: impl Into<String>, key: impl Into<String>) -> bool {
        self.relationships
            .entry(target_namespace.into())
            .or_default()
            .insert(key.into())
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Keys related to this record in `target_namespace`, in key order.
    pub fn related(&self, target_namespace: &str) -> impl Iterator<Item = &str> {
        self.relationships
            .get(target_namespace)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }
}
