//! Manifest view assembly.
//!
//! A view is built from one primary cache record, the event records related
//! to it, and an optional metric record, interpreted by the handler
//! registered for the resource's kind.

use std::sync::Arc;

use kubeview_cache::keys::{infrastructure_key, metric_key, METRIC_TYPE_NAMESPACE};
use kubeview_cache::{CacheClient, CacheDataConverter, RecordDecoder};
use kubeview_core::{
    sort_by_display_timestamp, EventRecord, Kind, KubeviewResult, ManifestView, MetricRecord,
    ProviderConfig, ResourceIdentity,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::HandlerRegistry;

/// Read-only provider of manifest views.
///
/// Holds no per-request state; clones share the cache client, registry and
/// decoder.
pub struct ManifestProvider<C: CacheClient + ?Sized> {
    cache: Arc<C>,
    registry: Arc<HandlerRegistry>,
    decoder: Arc<dyn RecordDecoder>,
    config: ProviderConfig,
}

impl<C: CacheClient + ?Sized> Clone for ManifestProvider<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            registry: Arc::clone(&self.registry),
            decoder: Arc::clone(&self.decoder),
            config: self.config.clone(),
        }
    }
}

impl<C: CacheClient + ?Sized> ManifestProvider<C> {
    /// Create a provider using [`CacheDataConverter`] to decode records.
    pub fn new(cache: Arc<C>, registry: Arc<HandlerRegistry>, config: ProviderConfig) -> Self {
        Self {
            cache,
            registry,
            decoder: Arc::new(CacheDataConverter::new()),
            config,
        }
    }

    /// Create a provider with the built-in handlers and default configuration.
    pub fn with_defaults(cache: Arc<C>) -> Self {
        Self::new(
            cache,
            Arc::new(HandlerRegistry::with_builtin_handlers()),
            ProviderConfig::default(),
        )
    }

    /// Replace the record decoder.
    pub fn with_decoder(mut self, decoder: Arc<dyn RecordDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Assemble the view of `name` (`<kind>/<name>`) in `account`/`location`.
    ///
    /// # Returns
    /// * `Ok(Some(view))` - The resource is cached and its kind has a handler
    /// * `Ok(None)` - The name does not parse, the resource is not cached, or
    ///   no handler is registered for its kind
    /// * `Err(_)` - The cache failed or returned data that does not decode
    pub async fn get_manifest(
        &self,
        account: &str,
        location: &str,
        name: &str,
    ) -> KubeviewResult<Option<ManifestView>> {
        let span = tracing::debug_span!(
            "get_manifest",
            request_id = %Uuid::now_v7(),
            account,
            location,
            name,
        );

        async move {
            let result = self.assemble(account, location, name).await;
            if let Err(e) = &result {
                tracing::error!(error = %e, "Manifest lookup failed");
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn assemble(
        &self,
        account: &str,
        location: &str,
        name: &str,
    ) -> KubeviewResult<Option<ManifestView>> {
        let mut identity = match ResourceIdentity::parse(account, location, name) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::debug!(error = %e, "Unparseable resource name, treating as not found");
                return Ok(None);
            }
        };

        if !identity.is_normalized() {
            tracing::warn!(
                kind = %identity.kind(),
                location = identity.location(),
                "Kind is not namespaced, ignoring supplied location"
            );
            identity = identity.without_location();
        }

        let kind = identity.kind();
        let key = infrastructure_key(
            kind,
            identity.account(),
            identity.location(),
            identity.name(),
        );
        let Some(record) = self.cache.get_single_entry(kind.as_str(), &key).await? else {
            tracing::debug!(key = %key, "No cache entry");
            return Ok(None);
        };

        let Some(handler) = self.registry.resolve(identity.account(), kind) else {
            tracing::debug!(kind = %kind, "No handler registered");
            return Ok(None);
        };

        let manifest = self.decoder.manifest(&record)?;
        let moniker = self.decoder.moniker(&record)?;

        let (events, metrics) = if self.config.concurrent_lookups {
            let (events, metrics) =
                tokio::join!(self.events_for(kind, &key), self.metrics_for(&identity));
            (events?, metrics?)
        } else {
            let events = self.events_for(kind, &key).await?;
            let metrics = self.metrics_for(&identity).await?;
            (events, metrics)
        };

        tracing::debug!(
            events = events.len(),
            metrics = metrics.len(),
            "Assembled manifest view"
        );

        Ok(Some(ManifestView {
            account: identity.account().to_string(),
            location: identity.location().to_string(),
            status: handler.status(&manifest),
            artifacts: handler.list_artifacts(&manifest),
            warnings: handler.list_warnings(&manifest),
            manifest,
            moniker,
            events,
            metrics,
        }))
    }

    /// Events related to the primary record, oldest first.
    async fn events_for(&self, kind: &Kind, key: &str) -> KubeviewResult<Vec<EventRecord>> {
        if !self.config.include_events {
            return Ok(Vec::new());
        }

        let records = self
            .cache
            .get_transitive_relationship(kind.as_str(), &[key.to_string()], Kind::Event.as_str())
            .await?;

        let mut events = records
            .iter()
            .map(|record| self.decoder.event(record))
            .collect::<KubeviewResult<Vec<_>>>()?;
        sort_by_display_timestamp(&mut events);
        Ok(events)
    }

    async fn metrics_for(&self, identity: &ResourceIdentity) -> KubeviewResult<Vec<MetricRecord>> {
        if !self.config.include_metrics {
            return Ok(Vec::new());
        }

        let key = metric_key(
            identity.kind(),
            identity.account(),
            identity.location(),
            identity.name(),
        );
        match self.cache.get_single_entry(METRIC_TYPE_NAMESPACE, &key).await? {
            Some(record) => self.decoder.metrics(&record),
            None => Ok(Vec::new()),
        }
    }
}

impl<C: CacheClient + ?Sized> std::fmt::Debug for ManifestProvider<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestProvider")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}
