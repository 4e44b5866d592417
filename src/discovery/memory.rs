//! In-process discovery registry.
//!
//! Used by tests and for running the gateway against a fixed service map.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;

use super::{DiscoveryBackend, DiscoveryError, PortSpec, ServiceMetadata};

/// Registry keyed by `(namespace, service)`.
#[derive(Debug, Default)]
pub struct InMemoryDiscovery {
    services: RwLock<HashMap<(String, String), Vec<PortSpec>>>,
    failing: AtomicBool,
    latency: RwLock<Option<Duration>>,
    queries: AtomicUsize,
}

impl InMemoryDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a service.
    pub fn register(&self, namespace: &str, name: &str, ports: Vec<PortSpec>) {
        if let Ok(mut services) = self.services.write() {
            services.insert((namespace.to_string(), name.to_string()), ports);
        }
    }

    pub fn deregister(&self, namespace: &str, name: &str) {
        if let Ok(mut services) = self.services.write() {
            services.remove(&(namespace.to_string(), name.to_string()));
        }
    }

    /// Make every subsequent query fail as if the backend were unreachable.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Delay every query by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        if let Ok(mut slot) = self.latency.write() {
            *slot = latency;
        }
    }

    /// Number of queries served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    async fn begin_query(&self) -> Result<(), DiscoveryError> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        let latency = self.latency.read().ok().and_then(|slot| *slot);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(DiscoveryError::Unavailable("registry offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DiscoveryBackend for InMemoryDiscovery {
    async fn get_service(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<ServiceMetadata, DiscoveryError> {
        self.begin_query().await?;

        let services = self
            .services
            .read()
            .map_err(|_| DiscoveryError::Unavailable("registry lock poisoned".to_string()))?;

        Ok(services
            .get(&(namespace.to_string(), name.to_string()))
            .map(|ports| ServiceMetadata::with_ports(ports.clone()))
            .unwrap_or_else(ServiceMetadata::absent))
    }
}
