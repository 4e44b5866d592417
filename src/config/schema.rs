//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind host, port, connection limit).
    pub listener: ListenerConfig,

    /// Hostname decoding settings.
    pub routing: RoutingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Resolver selection and discovery backend settings.
    pub discovery: DiscoveryConfig,

    /// Resolution cache settings.
    pub cache: CacheConfig,

    /// Background health probe settings.
    pub health_check: HealthCheckConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Listening port.
    pub port: u16,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl ListenerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_connections: 10_000,
        }
    }
}

/// Hostname decoding configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Base domain advertised on `/routes`.
    pub base_domain: String,

    /// Environment used when the hostname does not carry one.
    pub default_env: String,

    /// Namespaces that may be routed to. Empty admits all.
    pub allowed_namespaces: Vec<String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_domain: "localhost".to_string(),
            default_env: "dev".to_string(),
            allowed_namespaces: Vec::new(),
        }
    }
}

/// Timeout configuration for the listener, forwarding and resolution.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed to read request headers.
    #[serde(with = "humantime_serde")]
    pub read: Duration,

    /// Time allowed to produce a response.
    #[serde(with = "humantime_serde")]
    pub write: Duration,

    /// How long pooled upstream connections may sit idle.
    #[serde(with = "humantime_serde")]
    pub idle: Duration,

    /// Budget for a single service resolution.
    #[serde(with = "humantime_serde")]
    pub resolve: Duration,

    /// Drain deadline for in-flight connections on shutdown.
    #[serde(with = "humantime_serde")]
    pub shutdown: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(15),
            write: Duration::from_secs(15),
            idle: Duration::from_secs(60),
            resolve: Duration::from_secs(5),
            shutdown: Duration::from_secs(10),
        }
    }
}

/// Resolver selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Use the stand-in resolver instead of the cluster.
    pub dev_mode: bool,

    /// Suffix appended to `<service>.<namespace>` for in-cluster targets.
    pub cluster_suffix: String,

    /// Target every route resolves to in dev mode.
    pub dev_target: String,

    /// Fall back to the local kubeconfig when not running in a pod.
    pub allow_kubeconfig: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            dev_mode: false,
            cluster_suffix: "svc.cluster.local".to_string(),
            dev_target: "http://localhost:3000".to_string(),
            allow_kubeconfig: false,
        }
    }
}

/// Resolution cache configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Reuse resolutions until their freshness window closes.
    pub enabled: bool,
}

/// Background health probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable the probe (only effective with the cache enabled).
    pub enabled: bool,

    /// Time between probe rounds.
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: Duration::from_secs(30),
        }
    }
}

/// Observability configuration.
///
/// Log level and format come from `LOG_LEVEL`/`LOG_FORMAT`/`RUST_LOG` only,
/// since the subscriber has to exist before this file is read.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Prometheus exporter bind address; disabled when unset.
    pub metrics_address: Option<String>,
}
