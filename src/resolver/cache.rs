//! Resolution cache keyed by `(namespace, service)`.
//!
//! Entries are served only while their freshness window is open; an expired
//! entry behaves exactly like a miss and is re-resolved by the caller.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::observability::metrics;
use crate::resolver::BackendTarget;

type CacheKey = (String, String);

fn key(namespace: &str, service: &str) -> CacheKey {
    (namespace.to_string(), service.to_string())
}

/// Thread-safe store of recent resolutions.
#[derive(Debug, Clone, Default)]
pub struct ResolutionCache {
    inner: Arc<DashMap<CacheKey, BackendTarget>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh cached target, or `None` on miss or expiry.
    pub fn get(&self, namespace: &str, service: &str) -> Option<BackendTarget> {
        self.get_at(namespace, service, Utc::now())
    }

    pub fn get_at(
        &self,
        namespace: &str,
        service: &str,
        now: DateTime<Utc>,
    ) -> Option<BackendTarget> {
        let entry = self.inner.get(&key(namespace, service))?;
        if entry.is_fresh_at(now) {
            Some(entry.value().clone())
        } else {
            None
        }
    }

    pub fn insert(&self, target: BackendTarget) {
        self.inner
            .insert(key(&target.namespace, &target.service), target);
        metrics::record_cache_size(self.inner.len());
    }

    pub fn invalidate(&self, namespace: &str, service: &str) {
        if self.inner.remove(&key(namespace, service)).is_some() {
            metrics::clear_target_health(namespace, service);
        }
        metrics::record_cache_size(self.inner.len());
    }

    /// Write back a health result without touching the freshness window.
    ///
    /// Returns false when the entry is gone (evicted or invalidated meanwhile).
    pub fn update_health(&self, checked: &BackendTarget) -> bool {
        match self.inner.get_mut(&key(&checked.namespace, &checked.service)) {
            Some(mut entry) => {
                entry.healthy = checked.healthy;
                entry.last_checked_at = checked.last_checked_at;
                true
            }
            None => false,
        }
    }

    /// Drop every entry whose window has closed. Returns how many were removed.
    ///
    /// The health series of each evicted target is zeroed.
    pub fn evict_expired(&self) -> usize {
        let now = Utc::now();
        let mut evicted = Vec::new();
        self.inner.retain(|(namespace, service), target| {
            let fresh = target.is_fresh_at(now);
            if !fresh {
                evicted.push((namespace.clone(), service.clone()));
            }
            fresh
        });

        for (namespace, service) in &evicted {
            metrics::clear_target_health(namespace, service);
        }
        metrics::record_cache_size(self.inner.len());
        evicted.len()
    }

    /// Clone of every current entry, for the health probe.
    pub fn snapshot(&self) -> Vec<BackendTarget> {
        self.inner.iter().map(|r| r.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let now = Utc::now();
        let total = self.inner.len();
        let fresh = self.inner.iter().filter(|r| r.value().is_fresh_at(now)).count();
        let unhealthy = self.inner.iter().filter(|r| !r.value().healthy).count();
        CacheStats {
            total_entries: total,
            fresh_entries: fresh,
            expired_entries: total.saturating_sub(fresh),
            unhealthy_entries: unhealthy,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub fresh_entries: usize,
    pub expired_entries: usize,
    pub unhealthy_entries: usize,
}
