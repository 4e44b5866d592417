//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, port non-zero)
//! - Check the dev target and metrics address parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

use crate::config::schema::ProxyConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("allowed_namespaces contains an empty entry")]
    EmptyNamespace,

    #[error("dev_target {0:?} is not an http(s) URL with a host")]
    DevTarget(String),

    #[error("metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),
}

pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::Zero("listener.port"));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::Zero("listener.max_connections"));
    }

    if config.routing.base_domain.trim().is_empty() {
        errors.push(ValidationError::Empty("routing.base_domain"));
    }
    if config.routing.default_env.trim().is_empty() {
        errors.push(ValidationError::Empty("routing.default_env"));
    }
    if config.routing.allowed_namespaces.iter().any(|ns| ns.trim().is_empty()) {
        errors.push(ValidationError::EmptyNamespace);
    }

    let timeouts = [
        ("timeouts.read", config.timeouts.read),
        ("timeouts.write", config.timeouts.write),
        ("timeouts.idle", config.timeouts.idle),
        ("timeouts.resolve", config.timeouts.resolve),
        ("timeouts.shutdown", config.timeouts.shutdown),
        ("health_check.interval", config.health_check.interval),
    ];
    for (name, value) in timeouts {
        if value == Duration::ZERO {
            errors.push(ValidationError::Zero(name));
        }
    }

    if config.discovery.cluster_suffix.trim().is_empty() {
        errors.push(ValidationError::Empty("discovery.cluster_suffix"));
    }

    let dev_target_ok = Url::parse(&config.discovery.dev_target)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false);
    if !dev_target_ok {
        errors.push(ValidationError::DevTarget(config.discovery.dev_target.clone()));
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::MetricsAddress(addr.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
