//! Startup orchestration.
//!
//! # Responsibilities
//! - Select the resolver variant from configuration
//! - Connect the cluster discovery backend
//!
//! # Design Decisions
//! - Fail fast: if cluster discovery cannot be configured the process exits
//!   instead of serving 404s for every request
//! - Outside a pod the local kubeconfig is only used when explicitly allowed

use std::sync::Arc;

use url::Url;

use crate::config::ProxyConfig;
use crate::discovery::{DiscoveryError, KubeDiscovery};
use crate::net::install_crypto_provider;
use crate::resolver::{ClusterResolver, ServiceResolver, StandInResolver};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid dev target {target:?}: {source}")]
    DevTarget {
        target: String,
        #[source]
        source: url::ParseError,
    },

    #[error("cluster discovery unavailable: {0}")]
    Discovery(#[from] DiscoveryError),
}

/// Build the resolver selected by `config.discovery`.
pub async fn build_resolver(config: &ProxyConfig) -> Result<ServiceResolver, StartupError> {
    let discovery = &config.discovery;

    if discovery.dev_mode {
        let target = Url::parse(&discovery.dev_target).map_err(|source| StartupError::DevTarget {
            target: discovery.dev_target.clone(),
            source,
        })?;
        tracing::info!(target = %target, "Using stand-in resolver");
        return Ok(ServiceResolver::StandIn(StandInResolver::new(target)));
    }

    install_crypto_provider();
    let backend = if discovery.allow_kubeconfig {
        KubeDiscovery::inferred().await?
    } else {
        KubeDiscovery::in_cluster()?
    };

    tracing::info!(
        cluster_suffix = %discovery.cluster_suffix,
        kubeconfig_fallback = discovery.allow_kubeconfig,
        "Using cluster resolver"
    );
    Ok(ServiceResolver::Cluster(ClusterResolver::new(
        Arc::new(backend),
        discovery.cluster_suffix.clone(),
    )))
}
