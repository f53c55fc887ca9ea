//! The cache client boundary.
//!
//! The cache engine itself (ingestion, indexing, eviction) lives outside this
//! workspace. The manifest provider only needs point lookups and one-hop
//! relationship traversal, which is what this trait exposes.

use async_trait::async_trait;
use kubeview_core::KubeviewResult;
use std::collections::BTreeSet;

use crate::CacheRecord;

/// Read access to a key/value relationship cache.
///
/// Implementations must be safe for concurrent reads; the provider shares
/// one client across all requests and performs no locking of its own.
/// Errors are collaborator failures and propagate to the caller unchanged.
#[async_trait]
pub trait CacheClient: Send + Sync {
    /// Look up one record by exact key within a type namespace.
    ///
    /// Absence is `Ok(None)`, not an error.
    async fn get_single_entry(
        &self,
        type_namespace: &str,
        key: &str,
    ) -> KubeviewResult<Option<CacheRecord>>;

    /// All records in `target_namespace` related to any of `source_keys`.
    ///
    /// Missing source records and dangling relationship keys are skipped.
    /// Each target record appears at most once. Order is unspecified.
    ///
    /// The default loads each source record, collects its edges into the
    /// target namespace and loads those; backends with batch reads should
    /// override it.
    async fn get_transitive_relationship(
        &self,
        source_namespace: &str,
        source_keys: &[String],
        target_namespace: &str,
    ) -> KubeviewResult<Vec<CacheRecord>> {
        let mut target_keys = BTreeSet::new();
        for source_key in source_keys {
            if let Some(source) = self.get_single_entry(source_namespace, source_key).await? {
                target_keys.extend(source.related(target_namespace).map(str::to_string));
            }
        }

        let mut related = Vec::with_capacity(target_keys.len());
        for target_key in &target_keys {
            if let Some(record) = self.get_single_entry(target_namespace, target_key).await? {
                related.push(record);
            }
        }
        Ok(related)
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of point lookups that found a record.
    pub hits: u64,
    /// Number of point lookups that found nothing.
    pub misses: u64,
    /// Number of records currently stored.
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
