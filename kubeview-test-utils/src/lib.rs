//! KUBEVIEW Test Utilities
//!
//! Shared test infrastructure for the KUBEVIEW workspace:
//! - Proptest generators for kinds, identities and events
//! - A cache fixture that seeds an [`InMemoryCache`] the way the caching
//!   agents lay records out
//! - Scripted cache clients for failure paths
//! - Custom assertions for lookup results

pub use kubeview_cache::{CacheClient, CacheRecord, InMemoryCache};
pub use kubeview_core::{
    CacheError, EventRecord, Kind, KubeviewError, KubeviewResult, ManifestView, MetricRecord,
    Moniker, ResourceIdentity, BUILTIN_KINDS,
};

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ============================================================================
// MOCK CACHE CLIENTS
// ============================================================================

/// Cache client that fails every lookup, or only lookups in one namespace.
///
/// Lookups that do not fail are served from the wrapped cache.
#[derive(Debug)]
pub struct FailingCache {
    inner: Arc<InMemoryCache>,
    fail_on: Option<String>,
    failures: AtomicU64,
}

impl FailingCache {
    /// Fail every lookup.
    pub fn always() -> Self {
        Self {
            inner: Arc::new(InMemoryCache::new()),
            fail_on: None,
            failures: AtomicU64::new(0),
        }
    }

    /// Serve from `inner`, failing only lookups in `type_namespace`.
    pub fn on_namespace(inner: Arc<InMemoryCache>, type_namespace: impl Into<String>) -> Self {
        Self {
            inner,
            fail_on: Some(type_namespace.into()),
            failures: AtomicU64::new(0),
        }
    }

    /// Number of lookups that failed so far.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CacheClient for FailingCache {
    async fn get_single_entry(
        &self,
        type_namespace: &str,
        key: &str,
    ) -> KubeviewResult<Option<CacheRecord>> {
        let fails = self
            .fail_on
            .as_deref()
            .map_or(true, |namespace| namespace == type_namespace);
        if fails {
            self.failures.fetch_add(1, Ordering::Relaxed);
            return Err(CacheError::Unavailable {
                reason: format!("scripted failure reading {} from {}", key, type_namespace),
            }
            .into());
        }
        self.inner.get_single_entry(type_namespace, key).await
    }
}

// ============================================================================
// CACHE FIXTURE
// ============================================================================

/// Seeds an [`InMemoryCache`] with resources, events and metrics.
///
/// # Example
/// ```ignore
/// let fixture = CacheFixture::new();
/// let web = ResourceIdentity::new(Kind::Deployment, "prod", "default", "web");
/// fixture.resource(&web, fixtures::deployment_manifest("web", "default", 2, "nginx:1.27"));
/// fixture.event(&web, "web.1", fixtures::event_manifest("web.1", "default", Some("2024-01-01T00:00:00Z"), None));
/// let cache = fixture.into_shared();
/// ```
#[derive(Debug, Default)]
pub struct CacheFixture {
    cache: InMemoryCache,
}

impl CacheFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a resource with no moniker. Returns its key.
    pub fn resource(&self, identity: &ResourceIdentity, manifest: serde_json::Value) -> String {
        self.put_resource(identity, manifest, None)
    }

    /// Store a resource with a moniker. Returns its key.
    pub fn resource_with_moniker(
        &self,
        identity: &ResourceIdentity,
        manifest: serde_json::Value,
        moniker: &Moniker,
    ) -> String {
        let moniker = serde_json::to_value(moniker).expect("moniker serializes");
        self.put_resource(identity, manifest, Some(moniker))
    }

    fn put_resource(
        &self,
        identity: &ResourceIdentity,
        manifest: serde_json::Value,
        moniker: Option<serde_json::Value>,
    ) -> String {
        let key = kubeview_cache::keys::infrastructure_key(
            identity.kind(),
            identity.account(),
            identity.location(),
            identity.name(),
        );
        let mut record = CacheRecord::new(key.clone()).with_attribute("manifest", manifest);
        if let Some(moniker) = moniker {
            record = record.with_attribute("moniker", moniker);
        }
        self.cache
            .put(identity.kind().as_str(), record)
            .expect("fixture put succeeds");
        key
    }

    /// Store an event and relate `resource` to it. Returns the event key.
    ///
    /// # Panics
    ///
    /// If `resource` has not been stored yet, since there is no record to
    /// hang the edge on. Use [`CacheFixture::relate_event`] directly to
    /// script a missing edge.
    pub fn event(
        &self,
        resource: &ResourceIdentity,
        event_name: &str,
        manifest: serde_json::Value,
    ) -> String {
        let event_key = kubeview_cache::keys::infrastructure_key(
            &Kind::Event,
            resource.account(),
            resource.location(),
            event_name,
        );
        self.cache
            .put(
                Kind::Event.as_str(),
                CacheRecord::new(event_key.clone()).with_attribute("manifest", manifest),
            )
            .expect("fixture put succeeds");
        assert!(
            self.relate_event(resource, &event_key),
            "store {} before relating events to it",
            resource.full_name()
        );
        event_key
    }

    /// Add an edge from `resource` to an event key, stored or not.
    ///
    /// Returns `false` and adds nothing when `resource` is not stored.
    pub fn relate_event(&self, resource: &ResourceIdentity, event_key: &str) -> bool {
        let resource_key = kubeview_cache::keys::infrastructure_key(
            resource.kind(),
            resource.account(),
            resource.location(),
            resource.name(),
        );
        self.cache
            .relate(
                resource.kind().as_str(),
                &resource_key,
                Kind::Event.as_str(),
                event_key,
            )
            .expect("fixture relate succeeds")
    }

    /// Store the metric record for `identity`. Returns its key.
    pub fn metrics(&self, identity: &ResourceIdentity, metrics: &[MetricRecord]) -> String {
        let key = kubeview_cache::keys::metric_key(
            identity.kind(),
            identity.account(),
            identity.location(),
            identity.name(),
        );
        let value = serde_json::to_value(metrics).expect("metrics serialize");
        self.cache
            .put(
                kubeview_cache::keys::METRIC_TYPE_NAMESPACE,
                CacheRecord::new(key.clone()).with_attribute("metrics", value),
            )
            .expect("fixture put succeeds");
        key
    }

    pub fn cache(&self) -> &InMemoryCache {
        &self.cache
    }

    pub fn into_shared(self) -> Arc<InMemoryCache> {
        Arc::new(self.cache)
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating KUBEVIEW types.

    use super::*;
    use proptest::prelude::*;

    /// Generate a built-in kind.
    pub fn arb_builtin_kind() -> impl Strategy<Value = Kind> {
        (0..BUILTIN_KINDS.len()).prop_map(|idx| BUILTIN_KINDS[idx].clone())
    }

    /// Generate a group-qualified custom kind.
    pub fn arb_custom_kind() -> impl Strategy<Value = Kind> {
        "[a-z][a-z0-9-]{0,10}\\.[a-z][a-z0-9-]{0,10}\\.(io|dev|com)"
            .prop_map(|name| Kind::parse(&name).expect("generated custom kind is valid"))
    }

    pub fn arb_kind() -> impl Strategy<Value = Kind> {
        prop_oneof![4 => arb_builtin_kind(), 1 => arb_custom_kind()]
    }

    /// Account names, including the key separator and escape character.
    pub fn arb_account() -> impl Strategy<Value = String> {
        "[a-z0-9:%-]{1,16}"
    }

    pub fn arb_location() -> impl Strategy<Value = String> {
        "[a-z0-9:%-]{0,16}"
    }

    /// Resource names accepted by `ResourceIdentity::parse_full_name`.
    pub fn arb_resource_name() -> impl Strategy<Value = String> {
        "[a-z0-9][a-z0-9.:%-]{0,24}"
    }

    /// Generate a normalized identity: cluster-scoped kinds have no location.
    pub fn arb_identity() -> impl Strategy<Value = ResourceIdentity> {
        (arb_kind(), arb_account(), arb_location(), arb_resource_name()).prop_map(
            |(kind, account, location, name)| {
                let location = if kind.is_namespaced() {
                    location
                } else {
                    String::new()
                };
                ResourceIdentity::new(kind, account, location, name)
            },
        )
    }

    /// RFC 3339 timestamps within 2020-2029, or nothing.
    pub fn arb_timestamp() -> impl Strategy<Value = Option<String>> {
        proptest::option::of(
            (2020u32..2030, 1u32..13, 1u32..29, 0u32..24, 0u32..60).prop_map(
                |(year, month, day, hour, minute)| {
                    format!(
                        "{:04}-{:02}-{:02}T{:02}:{:02}:00Z",
                        year, month, day, hour, minute
                    )
                },
            ),
        )
    }

    pub fn arb_event() -> impl Strategy<Value = EventRecord> {
        ("[a-z0-9.]{1,16}", arb_timestamp(), arb_timestamp()).prop_map(
            |(name, first_timestamp, last_timestamp)| {
                let mut event = EventRecord::default();
                event.metadata.name = Some(name);
                event.first_timestamp = first_timestamp;
                event.last_timestamp = last_timestamp;
                event
            },
        )
    }

    pub fn arb_metric_record() -> impl Strategy<Value = MetricRecord> {
        ("[a-z][a-z0-9-]{0,12}", 0u32..4000, 1u32..2048).prop_map(|(container, cpu, memory)| {
            MetricRecord::new(container)
                .with_metric("cpu", format!("{}m", cpu))
                .with_metric("memory", format!("{}Mi", memory))
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Kubernetes objects in the shape the caching agents store them.

    use serde_json::{json, Value};

    /// A fully rolled-out deployment with one container.
    pub fn deployment_manifest(name: &str, namespace: &str, replicas: i64, image: &str) -> Value {
        json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": { "name": name, "namespace": namespace, "generation": 1 },
            "spec": {
                "replicas": replicas,
                "template": {
                    "spec": {
                        "containers": [{
                            "name": name,
                            "image": image,
                            "resources": { "limits": { "cpu": "500m", "memory": "256Mi" } }
                        }]
                    }
                }
            },
            "status": {
                "observedGeneration": 1,
                "replicas": replicas,
                "updatedReplicas": replicas,
                "availableReplicas": replicas,
                "readyReplicas": replicas
            }
        })
    }

    pub fn pod_manifest(name: &str, namespace: &str, phase: &str, image: &str) -> Value {
        json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": { "name": name, "namespace": namespace },
            "spec": { "containers": [{ "name": "main", "image": image }] },
            "status": { "phase": phase }
        })
    }

    pub fn config_map_manifest(name: &str, namespace: &str) -> Value {
        json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": { "name": name, "namespace": namespace },
            "data": { "key": "value" }
        })
    }

    pub fn namespace_manifest(name: &str) -> Value {
        json!({
            "apiVersion": "v1",
            "kind": "Namespace",
            "metadata": { "name": name },
            "status": { "phase": "Active" }
        })
    }

    pub fn event_manifest(
        name: &str,
        namespace: &str,
        first_timestamp: Option<&str>,
        last_timestamp: Option<&str>,
    ) -> Value {
        json!({
            "apiVersion": "v1",
            "kind": "Event",
            "metadata": { "name": name, "namespace": namespace },
            "reason": "Scheduled",
            "message": format!("event {}", name),
            "type": "Normal",
            "count": 1,
            "firstTimestamp": first_timestamp,
            "lastTimestamp": last_timestamp
        })
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for manifest lookup results.

    use super::*;

    /// Assert that a lookup found nothing and did not fail.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &KubeviewResult<Option<T>>) {
        match result {
            Ok(None) => {}
            other => panic!("Expected Ok(None), got: {:?}", other),
        }
    }

    /// Assert that a lookup found something and return it.
    #[track_caller]
    pub fn assert_found<T: std::fmt::Debug>(result: KubeviewResult<Option<T>>) -> T {
        match result {
            Ok(Some(value)) => value,
            other => panic!("Expected Ok(Some(_)), got: {:?}", other),
        }
    }

    /// Assert that a lookup failed with a cache error.
    #[track_caller]
    pub fn assert_cache_error<T: std::fmt::Debug>(result: &KubeviewResult<T>) {
        match result {
            Err(KubeviewError::Cache(_)) => {}
            other => panic!("Expected Cache error, got: {:?}", other),
        }
    }

    /// Assert that a lookup failed decoding a cached record.
    #[track_caller]
    pub fn assert_decode_error<T: std::fmt::Debug>(result: &KubeviewResult<T>) {
        match result {
            Err(KubeviewError::Decode(_)) => {}
            other => panic!("Expected Decode error, got: {:?}", other),
        }
    }
}
