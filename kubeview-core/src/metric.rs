//! Per-container resource metrics

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metrics sampled for one container, keyed by metric name (`cpu`, `memory`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    pub container_name: String,
    #[serde(default)]
    pub metrics: BTreeMap<String, String>,
}

impl MetricRecord {
    pub fn new(container_name: impl Into<String>) -> Self {
        Self {
            container_name: container_name.into(),
            metrics: BTreeMap::new(),
        }
    }

    pub fn with_metric(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.metrics.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.metrics.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_container_metrics() {
        let record: MetricRecord = serde_json::from_value(json!({
            "containerName": "app",
            "metrics": { "CPU(cores)": "3m", "MEMORY(bytes)": "21Mi" }
        }))
        .unwrap();

        assert_eq!(record.container_name, "app");
        assert_eq!(record.get("CPU(cores)"), Some("3m"));
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn test_builder() {
        let record = MetricRecord::new("app").with_metric("cpu", "5m");
        assert_eq!(record.metrics.len(), 1);
        assert_eq!(record.get("cpu"), Some("5m"));
    }
}
