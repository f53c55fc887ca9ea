//! Conversion of raw cache records into typed records.

use kubeview_core::{
    DecodeError, EventRecord, KubeviewError, KubeviewResult, Manifest, MetricRecord, Moniker,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::CacheRecord;

/// Attribute holding the Kubernetes object.
pub const MANIFEST_ATTRIBUTE: &str = "manifest";
/// Attribute holding the ownership moniker.
pub const MONIKER_ATTRIBUTE: &str = "moniker";
/// Attribute holding the list of container metrics.
pub const METRICS_ATTRIBUTE: &str = "metrics";

/// Decodes raw cache records into typed records.
///
/// Failures are [`DecodeError`]s: the cache returned data the provider
/// cannot interpret, which is a collaborator failure rather than absence.
pub trait RecordDecoder: Send + Sync {
    fn manifest(&self, record: &CacheRecord) -> KubeviewResult<Manifest>;

    fn moniker(&self, record: &CacheRecord) -> KubeviewResult<Moniker>;

    fn event(&self, record: &CacheRecord) -> KubeviewResult<EventRecord>;

    fn metrics(&self, record: &CacheRecord) -> KubeviewResult<Vec<MetricRecord>>;
}

/// Decoder for records written in the `manifest` / `moniker` / `metrics`
/// attribute layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheDataConverter;

impl CacheDataConverter {
    pub fn new() -> Self {
        Self
    }
}

impl RecordDecoder for CacheDataConverter {
    fn manifest(&self, record: &CacheRecord) -> KubeviewResult<Manifest> {
        let value = required(record, MANIFEST_ATTRIBUTE)?;
        Manifest::from_value(value.clone()).ok_or_else(|| {
            invalid(record, MANIFEST_ATTRIBUTE, "expected a JSON object".to_string())
        })
    }

    /// A record without a moniker gets an empty one.
    fn moniker(&self, record: &CacheRecord) -> KubeviewResult<Moniker> {
        match record.attribute(MONIKER_ATTRIBUTE) {
            None | Some(Value::Null) => Ok(Moniker::default()),
            Some(value) => typed(record, MONIKER_ATTRIBUTE, value),
        }
    }

    fn event(&self, record: &CacheRecord) -> KubeviewResult<EventRecord> {
        let value = required(record, MANIFEST_ATTRIBUTE)?;
        typed(record, MANIFEST_ATTRIBUTE, value)
    }

    /// A record without metrics has none.
    fn metrics(&self, record: &CacheRecord) -> KubeviewResult<Vec<MetricRecord>> {
        match record.attribute(METRICS_ATTRIBUTE) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => typed(record, METRICS_ATTRIBUTE, value),
        }
    }
}

fn required<'a>(record: &'a CacheRecord, attribute: &str) -> KubeviewResult<&'a Value> {
    record.attribute(attribute).ok_or_else(|| {
        DecodeError::MissingAttribute {
            key: record.id.clone(),
            attribute: attribute.to_string(),
        }
        .into()
    })
}

fn typed<T: DeserializeOwned>(
    record: &CacheRecord,
    attribute: &str,
    value: &Value,
) -> KubeviewResult<T> {
    serde_json::from_value(value.clone()).map_err(|e| invalid(record, attribute, e.to_string()))
}

fn invalid(record: &CacheRecord, attribute: &str, reason: String) -> KubeviewError {
    DecodeError::InvalidAttribute {
        key: record.id.clone(),
        attribute: attribute.to_string(),
        reason,
    }
    .into()
}
