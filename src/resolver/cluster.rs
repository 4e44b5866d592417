//! Discovery-backed resolution.
//!
//! # Responsibilities
//! - Look the routed service up by `(namespace, service)`
//! - Derive `<service>.<namespace>.<suffix>:<port>` from the first declared port
//! - Pick `https` for port 443 or a port named "https", `http` otherwise

use std::sync::Arc;

use url::Url;

use crate::discovery::{DiscoveryBackend, PortSpec};
use crate::resolver::{BackendTarget, ResolveError};
use crate::routing::Route;

/// Port used when a service declares none.
const DEFAULT_PORT: u16 = 80;

#[derive(Debug, Clone)]
pub struct ClusterResolver {
    discovery: Arc<dyn DiscoveryBackend>,
    cluster_suffix: String,
}

impl ClusterResolver {
    pub fn new(discovery: Arc<dyn DiscoveryBackend>, cluster_suffix: impl Into<String>) -> Self {
        Self {
            discovery,
            cluster_suffix: cluster_suffix.into(),
        }
    }

    pub fn cluster_suffix(&self) -> &str {
        &self.cluster_suffix
    }

    pub async fn resolve(&self, route: &Route) -> Result<BackendTarget, ResolveError> {
        let metadata = self
            .discovery
            .get_service(&route.namespace, &route.service)
            .await
            .map_err(|source| ResolveError::Discovery {
                namespace: route.namespace.clone(),
                service: route.service.clone(),
                source,
            })?;

        if !metadata.exists {
            return Err(ResolveError::NotFound {
                namespace: route.namespace.clone(),
                service: route.service.clone(),
            });
        }

        let (scheme, port) = match metadata.ports.first() {
            Some(port) => (scheme_for(port), port.number),
            None => ("http", DEFAULT_PORT),
        };

        let address = format!(
            "{}://{}.{}.{}:{}",
            scheme, route.service, route.namespace, self.cluster_suffix, port
        );
        let target_url = Url::parse(&address)
            .map_err(|source| ResolveError::InvalidTarget { address, source })?;

        tracing::debug!(
            service = %route.service,
            namespace = %route.namespace,
            target = %target_url,
            "Service resolved"
        );

        Ok(BackendTarget::new(
            route.service.clone(),
            route.namespace.clone(),
            target_url,
        ))
    }

    /// Existence check; any discovery error counts as unhealthy.
    pub async fn health_check(&self, target: &mut BackendTarget) -> bool {
        let healthy = match self.discovery.exists(&target.namespace, &target.service).await {
            Ok(exists) => exists,
            Err(e) => {
                tracing::warn!(
                    service = %target.service,
                    namespace = %target.namespace,
                    error = %e,
                    "Health check lookup failed"
                );
                false
            }
        };
        target.mark_checked(healthy);
        healthy
    }
}

fn scheme_for(port: &PortSpec) -> &'static str {
    if port.number == 443 || port.name.as_deref() == Some("https") {
        "https"
    } else {
        "http"
    }
}
