//! Kubernetes-backed discovery.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Service;
use kube::{Api, Client, Config};

use super::{DiscoveryBackend, DiscoveryError, PortSpec, ServiceMetadata};

/// Looks services up through the Kubernetes API server.
///
/// The underlying [`Client`] is cheaply cloneable and safe for concurrent use.
#[derive(Clone)]
pub struct KubeDiscovery {
    client: Client,
}

impl std::fmt::Debug for KubeDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeDiscovery").finish_non_exhaustive()
    }
}

impl KubeDiscovery {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the pod's service account.
    pub fn in_cluster() -> Result<Self, DiscoveryError> {
        let config = Config::incluster()
            .map_err(|e| DiscoveryError::Unavailable(format!("in-cluster config: {}", e)))?;
        let client = Client::try_from(config)?;
        Ok(Self::new(client))
    }

    /// Build a client from in-cluster config, falling back to the local kubeconfig.
    pub async fn inferred() -> Result<Self, DiscoveryError> {
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }

    fn services(&self, namespace: &str) -> Api<Service> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl DiscoveryBackend for KubeDiscovery {
    async fn get_service(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<ServiceMetadata, DiscoveryError> {
        let Some(service) = self.services(namespace).get_opt(name).await? else {
            return Ok(ServiceMetadata::absent());
        };

        let ports = service
            .spec
            .and_then(|spec| spec.ports)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|port| match u16::try_from(port.port) {
                Ok(number) => Some(PortSpec {
                    number,
                    name: port.name,
                }),
                Err(_) => {
                    tracing::warn!(
                        namespace = %namespace,
                        service = %name,
                        port = port.port,
                        "Ignoring out-of-range service port"
                    );
                    None
                }
            })
            .collect();

        Ok(ServiceMetadata::with_ports(ports))
    }

    async fn exists(&self, namespace: &str, name: &str) -> Result<bool, DiscoveryError> {
        Ok(self.services(namespace).get_opt(name).await?.is_some())
    }
}
