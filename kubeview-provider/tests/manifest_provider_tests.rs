//! End-to-end tests for manifest view assembly over the in-memory cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use kubeview_cache::{CacheDataConverter, RecordDecoder};
use kubeview_core::{
    DecodeError, EventRecord, Kind, KindHandler, KubeviewResult, Manifest, ManifestStatus,
    MetricRecord, Moniker, ProviderConfig, ResourceIdentity, WarningKind,
};
use kubeview_provider::{GenericHandler, HandlerRegistry, ManifestProvider};
use kubeview_test_utils::assertions::{
    assert_cache_error, assert_decode_error, assert_found, assert_not_found,
};
use kubeview_test_utils::fixtures::{
    config_map_manifest, deployment_manifest, event_manifest, namespace_manifest, pod_manifest,
};
use kubeview_test_utils::{CacheClient, CacheFixture, CacheRecord, FailingCache, InMemoryCache};

// ============================================================================
// HELPERS
// ============================================================================

/// Counts lookups made against the wrapped cache.
struct CountingCache {
    inner: Arc<InMemoryCache>,
    lookups: AtomicU64,
}

impl CountingCache {
    fn new(inner: Arc<InMemoryCache>) -> Self {
        Self {
            inner,
            lookups: AtomicU64::new(0),
        }
    }

    fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CacheClient for CountingCache {
    async fn get_single_entry(
        &self,
        type_namespace: &str,
        key: &str,
    ) -> KubeviewResult<Option<CacheRecord>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.inner.get_single_entry(type_namespace, key).await
    }
}

/// Decoder that delegates to [`CacheDataConverter`] with scripted overrides.
#[derive(Default)]
struct ScriptedDecoder {
    inner: CacheDataConverter,
    moniker: Option<Moniker>,
    metrics: Option<Vec<MetricRecord>>,
    fail_events: bool,
}

impl RecordDecoder for ScriptedDecoder {
    fn manifest(&self, record: &CacheRecord) -> KubeviewResult<Manifest> {
        self.inner.manifest(record)
    }

    fn moniker(&self, record: &CacheRecord) -> KubeviewResult<Moniker> {
        match &self.moniker {
            Some(moniker) => Ok(moniker.clone()),
            None => self.inner.moniker(record),
        }
    }

    fn event(&self, record: &CacheRecord) -> KubeviewResult<EventRecord> {
        if self.fail_events {
            return Err(DecodeError::InvalidAttribute {
                key: record.id.clone(),
                attribute: "manifest".to_string(),
                reason: "scripted event failure".to_string(),
            }
            .into());
        }
        let mut event = self.inner.event(record)?;
        event.reason = Some("Rewritten".to_string());
        Ok(event)
    }

    fn metrics(&self, record: &CacheRecord) -> KubeviewResult<Vec<MetricRecord>> {
        match &self.metrics {
            Some(metrics) => Ok(metrics.clone()),
            None => self.inner.metrics(record),
        }
    }
}

fn web() -> ResourceIdentity {
    ResourceIdentity::new(Kind::Deployment, "prod", "default", "web")
}

fn seeded_web() -> CacheFixture {
    let fixture = CacheFixture::new();
    fixture.resource_with_moniker(
        &web(),
        deployment_manifest("web", "default", 2, "gcr.io/team/web:1.4.0"),
        &Moniker::new("web", "web-main"),
    );
    fixture
}

// ============================================================================
// NOT FOUND
// ============================================================================

#[tokio::test]
async fn test_space_separated_name_is_not_found_without_lookup() {
    let cache = Arc::new(CountingCache::new(seeded_web().into_shared()));
    let provider = ManifestProvider::with_defaults(Arc::clone(&cache));

    let result = provider.get_manifest("prod", "default", "deployment mydeploy").await;
    assert_not_found(&result);
    assert_eq!(cache.lookups(), 0);
}

#[tokio::test]
async fn test_missing_primary_record_is_not_found() {
    let provider = ManifestProvider::with_defaults(seeded_web().into_shared());

    assert_not_found(&provider.get_manifest("prod", "default", "deployment/api").await);
    assert_not_found(&provider.get_manifest("staging", "default", "deployment/web").await);
    assert_not_found(&provider.get_manifest("prod", "other", "deployment/web").await);
    assert_not_found(&provider.get_manifest("prod", "default", "replicaSet/web").await);
}

#[tokio::test]
async fn test_kind_without_handler_is_not_found() {
    let fixture = CacheFixture::new();
    let kind = Kind::parse("certificate.cert-manager.io").unwrap();
    let certificate = ResourceIdentity::new(kind.clone(), "prod", "default", "tls");
    fixture.resource(&certificate, serde_json::json!({ "kind": "Certificate" }));
    let cache = fixture.into_shared();

    let provider = ManifestProvider::with_defaults(Arc::clone(&cache));
    assert_not_found(
        &provider
            .get_manifest("prod", "default", "certificate.cert-manager.io/tls")
            .await,
    );

    let mut registry = HandlerRegistry::with_builtin_handlers();
    registry.register(Arc::new(GenericHandler::new(kind)));
    let provider = ManifestProvider::new(cache, Arc::new(registry), ProviderConfig::default());
    let view = assert_found(
        provider
            .get_manifest("prod", "default", "certificate.cert-manager.io/tls")
            .await,
    );
    assert!(view.status.is_stable());
}

// ============================================================================
// VIEW ASSEMBLY
// ============================================================================

#[tokio::test]
async fn test_found_without_events_or_metrics() {
    let provider = ManifestProvider::with_defaults(seeded_web().into_shared());

    let view = assert_found(provider.get_manifest("prod", "default", "deployment/web").await);

    assert_eq!(view.account, "prod");
    assert_eq!(view.location, "default");
    assert_eq!(view.manifest.name(), Some("web"));
    assert_eq!(view.moniker, Moniker::new("web", "web-main"));
    assert!(view.events.is_empty());
    assert!(view.metrics.is_empty());
    assert!(view.status.is_stable());
    assert!(view.warnings.is_empty());
    assert_eq!(view.artifacts.len(), 1);
    assert_eq!(view.artifacts[0].artifact_type, "docker/image");
    assert_eq!(view.artifacts[0].name, "gcr.io/team/web");
    assert_eq!(view.artifacts[0].version.as_deref(), Some("1.4.0"));
}

#[tokio::test]
async fn test_kind_name_is_case_insensitive() {
    let provider = ManifestProvider::with_defaults(seeded_web().into_shared());
    assert_found(provider.get_manifest("prod", "default", "Deployment/web").await);
}

#[tokio::test]
async fn test_events_sorted_by_display_timestamp() {
    let fixture = seeded_web();
    fixture.event(
        &web(),
        "web.b",
        event_manifest("web.b", "default", None, Some("2024-01-02")),
    );
    fixture.event(
        &web(),
        "web.a",
        event_manifest("web.a", "default", None, Some("2024-01-01")),
    );
    fixture.event(&web(), "web.none", event_manifest("web.none", "default", None, None));
    fixture.event(
        &web(),
        "web.first",
        event_manifest("web.first", "default", Some("2024-01-01T12:00:00Z"), None),
    );
    let provider = ManifestProvider::with_defaults(fixture.into_shared());

    let view = assert_found(provider.get_manifest("prod", "default", "deployment/web").await);
    let timestamps: Vec<&str> = view.events.iter().map(|e| e.display_timestamp()).collect();
    assert_eq!(
        timestamps,
        vec!["2024-01-01", "2024-01-01T12:00:00Z", "2024-01-02", "n/a"]
    );
}

#[tokio::test]
async fn test_dangling_event_edges_are_skipped() {
    let fixture = seeded_web();
    fixture.event(
        &web(),
        "web.1",
        event_manifest("web.1", "default", None, Some("2024-03-01T00:00:00Z")),
    );
    assert!(fixture.relate_event(&web(), "kubernetes.v2:infrastructure:event:prod:default:gone"));
    let provider = ManifestProvider::with_defaults(fixture.into_shared());

    let view = assert_found(provider.get_manifest("prod", "default", "deployment/web").await);
    assert_eq!(view.events.len(), 1);
    assert_eq!(view.events[0].metadata.name.as_deref(), Some("web.1"));
}

#[tokio::test]
async fn test_metrics_are_attached() {
    let fixture = seeded_web();
    let metrics = vec![
        MetricRecord::new("web")
            .with_metric("cpu", "120m")
            .with_metric("memory", "200Mi"),
        MetricRecord::new("sidecar").with_metric("cpu", "5m"),
    ];
    fixture.metrics(&web(), &metrics);
    let provider = ManifestProvider::with_defaults(fixture.into_shared());

    let view = assert_found(provider.get_manifest("prod", "default", "deployment/web").await);
    assert_eq!(view.metrics, metrics);
}

#[tokio::test]
async fn test_disabled_lookups_yield_empty_lists() {
    let fixture = seeded_web();
    fixture.event(&web(), "web.1", event_manifest("web.1", "default", None, None));
    fixture.metrics(&web(), &[MetricRecord::new("web").with_metric("cpu", "1m")]);
    let cache = Arc::new(CountingCache::new(fixture.into_shared()));

    let provider = ManifestProvider::new(
        Arc::clone(&cache),
        Arc::new(HandlerRegistry::with_builtin_handlers()),
        ProviderConfig::default().with_events(false).with_metrics(false),
    );

    let view = assert_found(provider.get_manifest("prod", "default", "deployment/web").await);
    assert!(view.events.is_empty());
    assert!(view.metrics.is_empty());
    assert_eq!(cache.lookups(), 1);
}

#[tokio::test]
async fn test_cluster_scoped_location_is_cleared() {
    let fixture = CacheFixture::new();
    fixture.resource(
        &ResourceIdentity::new(Kind::Namespace, "prod", "", "team-a"),
        namespace_manifest("team-a"),
    );
    let provider = ManifestProvider::with_defaults(fixture.into_shared());

    let view = assert_found(provider.get_manifest("prod", "default", "namespace/team-a").await);
    assert_eq!(view.location, "");

    let same = assert_found(provider.get_manifest("prod", "", "namespace/team-a").await);
    assert_eq!(view, same);
}

#[tokio::test]
async fn test_pod_and_config_map_handlers() {
    let fixture = CacheFixture::new();
    fixture.resource(
        &ResourceIdentity::new(Kind::Pod, "prod", "default", "web-abc"),
        pod_manifest("web-abc", "default", "Pending", "nginx"),
    );
    fixture.resource(
        &ResourceIdentity::new(Kind::ConfigMap, "prod", "default", "settings-v004"),
        config_map_manifest("settings-v004", "default"),
    );
    let provider = ManifestProvider::with_defaults(fixture.into_shared());

    let pod = assert_found(provider.get_manifest("prod", "default", "pod/web-abc").await);
    assert!(!pod.status.is_stable());
    assert!(pod
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::UnpinnedImage));
    assert!(pod
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::MissingResourceLimits));

    let config = assert_found(
        provider
            .get_manifest("prod", "default", "configMap/settings-v004")
            .await,
    );
    assert_eq!(config.artifacts.len(), 1);
    assert_eq!(config.artifacts[0].artifact_type, "kubernetes/configMap");
    assert_eq!(config.artifacts[0].version.as_deref(), Some("v004"));
}

#[tokio::test]
async fn test_account_handler_override() {
    struct Frozen;

    impl KindHandler for Frozen {
        fn kind(&self) -> Kind {
            Kind::Deployment
        }

        fn status(&self, _manifest: &Manifest) -> ManifestStatus {
            ManifestStatus::stable().paused("frozen by policy")
        }
    }

    let fixture = seeded_web();
    fixture.resource(
        &ResourceIdentity::new(Kind::Deployment, "legacy", "default", "web"),
        deployment_manifest("web", "default", 1, "web:1"),
    );
    let mut registry = HandlerRegistry::with_builtin_handlers();
    registry.register_for_account("legacy", Arc::new(Frozen));
    let provider = ManifestProvider::new(
        fixture.into_shared(),
        Arc::new(registry),
        ProviderConfig::default(),
    );

    let legacy = assert_found(provider.get_manifest("legacy", "default", "deployment/web").await);
    assert!(legacy.status.paused.state);
    assert!(legacy.artifacts.is_empty());

    let prod = assert_found(provider.get_manifest("prod", "default", "deployment/web").await);
    assert!(!prod.status.paused.state);
}

#[tokio::test]
async fn test_repeated_calls_are_identical() {
    let fixture = seeded_web();
    fixture.event(&web(), "web.1", event_manifest("web.1", "default", None, Some("2024-01-01")));
    fixture.metrics(&web(), &[MetricRecord::new("web").with_metric("cpu", "3m")]);
    let provider = ManifestProvider::with_defaults(fixture.into_shared());

    let first = provider.get_manifest("prod", "default", "deployment/web").await.unwrap();
    let second = provider.get_manifest("prod", "default", "deployment/web").await.unwrap();
    assert!(first.is_some());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_event_payload_keeps_untyped_fields() {
    let fixture = seeded_web();
    let mut manifest = event_manifest("web.1", "default", None, Some("2024-01-01"));
    manifest["source"] = serde_json::json!({ "component": "deployment-controller" });
    fixture.event(&web(), "web.1", manifest);
    let provider = ManifestProvider::with_defaults(fixture.into_shared());

    let view = assert_found(provider.get_manifest("prod", "default", "deployment/web").await);
    let event = serde_json::to_value(&view.events[0]).unwrap();
    assert_eq!(event["source"]["component"], "deployment-controller");
    assert!(event.get("firstTimestamp").is_none());
}

#[tokio::test]
async fn test_custom_decoder_output_reaches_view() {
    let fixture = seeded_web();
    fixture.event(&web(), "web.1", event_manifest("web.1", "default", None, Some("2024-01-01")));
    fixture.metrics(&web(), &[MetricRecord::new("web").with_metric("cpu", "1m")]);
    let decoder = ScriptedDecoder {
        moniker: Some(Moniker::new("web", "web-canary")),
        metrics: Some(vec![MetricRecord::new("web").with_metric("cpu", "42m")]),
        ..ScriptedDecoder::default()
    };
    let provider = ManifestProvider::with_defaults(fixture.into_shared())
        .with_decoder(Arc::new(decoder));

    let view = assert_found(provider.get_manifest("prod", "default", "deployment/web").await);
    assert_eq!(view.moniker, Moniker::new("web", "web-canary"));
    assert_eq!(view.metrics, vec![MetricRecord::new("web").with_metric("cpu", "42m")]);
    assert_eq!(view.events.len(), 1);
    assert_eq!(view.events[0].reason.as_deref(), Some("Rewritten"));
}

// ============================================================================
// COLLABORATOR FAILURES
// ============================================================================

#[tokio::test]
async fn test_custom_decoder_event_failure_propagates() {
    let fixture = seeded_web();
    fixture.event(&web(), "web.1", event_manifest("web.1", "default", None, None));
    let decoder = ScriptedDecoder {
        fail_events: true,
        ..ScriptedDecoder::default()
    };
    let provider = ManifestProvider::with_defaults(fixture.into_shared())
        .with_decoder(Arc::new(decoder));

    assert_decode_error(&provider.get_manifest("prod", "default", "deployment/web").await);
}

#[tokio::test]
async fn test_custom_decoder_is_unused_when_events_disabled() {
    let fixture = seeded_web();
    fixture.event(&web(), "web.1", event_manifest("web.1", "default", None, None));
    let decoder = ScriptedDecoder {
        fail_events: true,
        ..ScriptedDecoder::default()
    };
    let provider = ManifestProvider::new(
        fixture.into_shared(),
        Arc::new(HandlerRegistry::with_builtin_handlers()),
        ProviderConfig::default().with_events(false),
    )
    .with_decoder(Arc::new(decoder));

    let view = assert_found(provider.get_manifest("prod", "default", "deployment/web").await);
    assert!(view.events.is_empty());
}

#[tokio::test]
async fn test_cache_failure_propagates() {
    let provider = ManifestProvider::with_defaults(Arc::new(FailingCache::always()));
    assert_cache_error(&provider.get_manifest("prod", "default", "deployment/web").await);
}

#[tokio::test]
async fn test_event_traversal_failure_propagates() {
    let fixture = seeded_web();
    fixture.event(&web(), "web.1", event_manifest("web.1", "default", None, None));
    let cache = Arc::new(FailingCache::on_namespace(fixture.into_shared(), "event"));
    let provider = ManifestProvider::with_defaults(Arc::clone(&cache));

    assert_cache_error(&provider.get_manifest("prod", "default", "deployment/web").await);
    assert_eq!(cache.failures(), 1);
}

#[tokio::test]
async fn test_metric_lookup_failure_propagates() {
    let cache = FailingCache::on_namespace(seeded_web().into_shared(), "kubernetesMetric");
    let provider = ManifestProvider::new(
        Arc::new(cache),
        Arc::new(HandlerRegistry::with_builtin_handlers()),
        ProviderConfig::default().with_concurrent_lookups(false),
    );

    assert_cache_error(&provider.get_manifest("prod", "default", "deployment/web").await);
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_share_provider() {
    let fixture = seeded_web();
    for idx in 0..8 {
        let name = format!("web.{}", idx);
        let timestamp = format!("2024-01-0{}", idx + 1);
        let manifest = event_manifest(&name, "default", None, Some(timestamp.as_str()));
        fixture.event(&web(), &name, manifest);
    }
    let provider = ManifestProvider::with_defaults(fixture.into_shared());
    let expected = provider.get_manifest("prod", "default", "deployment/web").await.unwrap();

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let provider = provider.clone();
            tokio::spawn(async move {
                provider.get_manifest("prod", "default", "deployment/web").await
            })
        })
        .collect();

    for handle in handles {
        let view = handle.await.unwrap().unwrap();
        assert_eq!(view, expected);
    }
}
