//! In-memory cache client.
//!
//! Backs tests and fixtures, and small single-process deployments where the
//! populating agent runs in the same process.

use async_trait::async_trait;
use kubeview_core::{CacheError, Kind, KubeviewResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::keys::{CacheKey, KeyType, METRIC_TYPE_NAMESPACE};
use crate::{CacheClient, CacheRecord, CacheStats};

type Namespaces = HashMap<String, HashMap<String, CacheRecord>>;

/// Cache client holding records in per-namespace hash maps.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    namespaces: RwLock<Namespaces>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> KubeviewResult<std::sync::RwLockReadGuard<'_, Namespaces>> {
        self.namespaces
            .read()
            .map_err(|_| CacheError::LockPoisoned.into())
    }

    fn write(&self) -> KubeviewResult<std::sync::RwLockWriteGuard<'_, Namespaces>> {
        self.namespaces
            .write()
            .map_err(|_| CacheError::LockPoisoned.into())
    }

    /// Insert or replace a record, returning the previous one.
    pub fn put(
        &self,
        type_namespace: &str,
        record: CacheRecord,
    ) -> KubeviewResult<Option<CacheRecord>> {
        let mut namespaces = self.write()?;
        Ok(namespaces
            .entry(type_namespace.to_string())
            .or_default()
            .insert(record.id.clone(), record))
    }

    /// Add a relationship edge from an existing source record.
    ///
    /// Returns `false` when the source record does not exist. The target
    /// need not exist yet; traversal skips dangling edges.
    pub fn relate(
        &self,
        source_namespace: &str,
        source_key: &str,
        target_namespace: &str,
        target_key: &str,
    ) -> KubeviewResult<bool> {
        let mut namespaces = self.write()?;
        let Some(source) = namespaces
            .get_mut(source_namespace)
            .and_then(|records| records.get_mut(source_key))
        else {
            return Ok(false);
        };
        source.relate(target_namespace, target_key);
        Ok(true)
    }

    pub fn evict(&self, type_namespace: &str, key: &str) -> KubeviewResult<Option<CacheRecord>> {
        let mut namespaces = self.write()?;
        Ok(namespaces
            .get_mut(type_namespace)
            .and_then(|records| records.remove(key)))
    }

    /// Evict the records of one kind in `account`: the primary records in
    /// the kind's namespace and their metric records.
    ///
    /// Matches keys by [`CacheKey::account_prefix`], so only keys in the
    /// canonical layout are evicted. Returns the number evicted.
    pub fn evict_account(&self, kind: &Kind, account: &str) -> KubeviewResult<u64> {
        let mut namespaces = self.write()?;
        let mut evicted = 0u64;
        for (type_namespace, key_type) in [
            (kind.as_str(), KeyType::Infrastructure),
            (METRIC_TYPE_NAMESPACE, KeyType::Metric),
        ] {
            let Some(records) = namespaces.get_mut(type_namespace) else {
                continue;
            };
            let prefix = CacheKey::account_prefix(key_type, kind, account);
            let before = records.len();
            records.retain(|key, _| !key.starts_with(&prefix));
            evicted += (before - records.len()) as u64;
        }
        tracing::debug!(kind = %kind, account, evicted, "Evicted account from in-memory cache");
        Ok(evicted)
    }

    /// Drop every record. Hit and miss counters are kept.
    pub fn clear(&self) -> KubeviewResult<()> {
        let mut namespaces = self.write()?;
        let stats = CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: namespaces.values().map(|records| records.len() as u64).sum(),
        };
        namespaces.clear();
        tracing::debug!(
            entries = stats.entry_count,
            hit_rate = stats.hit_rate(),
            "Cleared in-memory cache"
        );
        Ok(())
    }

    pub fn stats(&self) -> KubeviewResult<CacheStats> {
        let entry_count = self.read()?.values().map(|records| records.len() as u64).sum();
        Ok(CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count,
        })
    }
}

#[async_trait]
impl CacheClient for InMemoryCache {
    async fn get_single_entry(
        &self,
        type_namespace: &str,
        key: &str,
    ) -> KubeviewResult<Option<CacheRecord>> {
        let record = self
            .read()?
            .get(type_namespace)
            .and_then(|records| records.get(key))
            .cloned();

        let counter = if record.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);

        Ok(record)
    }
}
