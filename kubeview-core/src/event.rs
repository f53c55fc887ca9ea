//! Kubernetes events related to a resource

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Display timestamp for an event that carries neither timestamp field.
pub const UNKNOWN_TIMESTAMP: &str = "n/a";

/// A cached Kubernetes event.
///
/// Every typed field is optional so that partially populated events still
/// decode. Fields without a typed counterpart (`source`, `eventTime`,
/// `series`, ...) are kept in `extra` and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(default)]
    pub metadata: EventMetadata,
    #[serde(default)]
    pub involved_object: ObjectReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_timestamp: Option<String>,
    #[serde(flatten)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub extra: BTreeMap<String, Value>,
}

impl EventRecord {
    /// Timestamp used to order events for display.
    ///
    /// `last_timestamp`, falling back to `first_timestamp`, falling back to
    /// [`UNKNOWN_TIMESTAMP`]. The value is the raw cached string.
    pub fn display_timestamp(&self) -> &str {
        self.last_timestamp
            .as_deref()
            .or(self.first_timestamp.as_deref())
            .unwrap_or(UNKNOWN_TIMESTAMP)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EventMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// `uid`, `creationTimestamp`, labels and the rest.
    #[serde(flatten)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub extra: BTreeMap<String, Value>,
}

/// The object an event refers to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(flatten)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub extra: BTreeMap<String, Value>,
}

/// Sort events ascending by [`EventRecord::display_timestamp`].
///
/// Comparison is on the raw strings, not parsed times: RFC 3339 values in
/// one format order chronologically, but mixed formats and the `n/a`
/// sentinel fall wherever plain string order puts them. The sort is stable.
pub fn sort_by_display_timestamp(events: &mut [EventRecord]) {
    events.sort_by(|a, b| a.display_timestamp().cmp(b.display_timestamp()));
}
