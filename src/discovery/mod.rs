//! Service discovery backend.
//!
//! # Data Flow
//! ```text
//! ClusterResolver
//!     → DiscoveryBackend::get_service(namespace, name)
//!         → kube.rs   (Kubernetes API, production)
//!         → memory.rs (in-process registry, tests and local runs)
//!     → ServiceMetadata { exists, ports }
//! ```
//!
//! # Design Decisions
//! - Narrow, read-only interface; implementations must be safe to share
//!   across concurrent requests without caller-side locking
//! - "Absent" is data (`exists = false`), "unreachable" is an error

pub mod kube;
pub mod memory;

use async_trait::async_trait;

pub use self::kube::KubeDiscovery;
pub use self::memory::InMemoryDiscovery;

/// A single declared port of a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    pub number: u16,
    pub name: Option<String>,
}

impl PortSpec {
    pub fn new(number: u16) -> Self {
        Self { number, name: None }
    }

    pub fn named(number: u16, name: impl Into<String>) -> Self {
        Self {
            number,
            name: Some(name.into()),
        }
    }
}

/// What the registry knows about a service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceMetadata {
    pub exists: bool,
    /// Ports in declaration order.
    pub ports: Vec<PortSpec>,
}

impl ServiceMetadata {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn with_ports(ports: Vec<PortSpec>) -> Self {
        Self {
            exists: true,
            ports,
        }
    }
}

/// Failure to talk to the discovery backend.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("kubernetes API error: {0}")]
    Kube(#[from] ::kube::Error),

    #[error("discovery backend unavailable: {0}")]
    Unavailable(String),
}

/// Registry lookups needed by the cluster resolver.
#[async_trait]
pub trait DiscoveryBackend: Send + Sync + std::fmt::Debug {
    /// Fetch metadata for `name` in `namespace`.
    async fn get_service(&self, namespace: &str, name: &str)
        -> Result<ServiceMetadata, DiscoveryError>;

    /// Existence-only probe.
    async fn exists(&self, namespace: &str, name: &str) -> Result<bool, DiscoveryError> {
        Ok(self.get_service(namespace, name).await?.exists)
    }
}
