//! Service resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Route (valid)
//!     → cache.rs (optional: fresh BackendTarget for (namespace, service)?)
//!     → ServiceResolver
//!         Cluster  → cluster.rs  (discovery backend lookup)
//!         StandIn  → stand_in.rs (fixed local target)
//!     → BackendTarget { target_url, healthy, last_checked_at, fresh_until }
//! ```
//!
//! # Design Decisions
//! - The resolver strategy is chosen once at start-up and is a plain enum
//! - "Absent" and "discovery failed" are distinct errors internally but
//!   belong to the same not-found class for callers
//! - Resolution never probes the backend; health is a separate operation

pub mod cache;
pub mod cluster;
pub mod stand_in;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

use crate::discovery::DiscoveryError;
use crate::routing::Route;

pub use cache::{CacheStats, ResolutionCache};
pub use cluster::ClusterResolver;
pub use stand_in::StandInResolver;

/// Validity window attached to every fresh resolution.
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(5 * 60);

/// A resolved forwarding destination plus its last known health.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendTarget {
    pub service: String,
    pub namespace: String,
    pub target_url: Url,
    pub healthy: bool,
    pub last_checked_at: DateTime<Utc>,
    pub fresh_until: DateTime<Utc>,
}

impl BackendTarget {
    /// A healthy target checked now and fresh for [`FRESHNESS_WINDOW`].
    pub fn new(service: impl Into<String>, namespace: impl Into<String>, target_url: Url) -> Self {
        let now = Utc::now();
        Self {
            service: service.into(),
            namespace: namespace.into(),
            target_url,
            healthy: true,
            last_checked_at: now,
            fresh_until: now + window(),
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }

    pub fn is_fresh_at(&self, at: DateTime<Utc>) -> bool {
        self.fresh_until > at
    }

    /// Record the outcome of a health check.
    pub fn mark_checked(&mut self, healthy: bool) {
        self.healthy = healthy;
        self.last_checked_at = Utc::now();
    }

    /// `scheme://host:port`, always with an explicit port.
    pub fn origin(&self) -> String {
        let url = &self.target_url;
        format!(
            "{}://{}:{}",
            url.scheme(),
            url.host_str().unwrap_or_default(),
            url.port_or_known_default().unwrap_or(80)
        )
    }
}

fn window() -> chrono::Duration {
    chrono::Duration::seconds(FRESHNESS_WINDOW.as_secs() as i64)
}

/// Why a route could not be turned into a target.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("service {service}.{namespace} not found")]
    NotFound { namespace: String, service: String },

    #[error("discovery lookup for {service}.{namespace} failed: {source}")]
    Discovery {
        namespace: String,
        service: String,
        #[source]
        source: DiscoveryError,
    },

    #[error("resolution exceeded budget of {0:?}")]
    TimedOut(Duration),

    #[error("invalid target address {address}: {source}")]
    InvalidTarget {
        address: String,
        #[source]
        source: url::ParseError,
    },
}

impl ResolveError {
    /// True when the registry answered and the service simply is not there.
    pub fn is_absent(&self) -> bool {
        matches!(self, ResolveError::NotFound { .. })
    }
}

/// The active resolution strategy.
#[derive(Debug)]
pub enum ServiceResolver {
    /// Discovery-backed resolution for in-cluster deployments.
    Cluster(ClusterResolver),
    /// Fixed local target for development.
    StandIn(StandInResolver),
}

impl ServiceResolver {
    pub async fn resolve(&self, route: &Route) -> Result<BackendTarget, ResolveError> {
        match self {
            ServiceResolver::Cluster(r) => r.resolve(route).await,
            ServiceResolver::StandIn(r) => Ok(r.resolve(route)),
        }
    }

    /// Re-check `target`, updating its health and check time in place.
    pub async fn health_check(&self, target: &mut BackendTarget) -> bool {
        match self {
            ServiceResolver::Cluster(r) => r.health_check(target).await,
            ServiceResolver::StandIn(r) => r.health_check(target),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ServiceResolver::Cluster(_) => "cluster",
            ServiceResolver::StandIn(_) => "stand-in",
        }
    }
}
