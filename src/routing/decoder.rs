//! Hostname decoding.
//!
//! # Responsibilities
//! - Split a hostname into service, namespace, environment and base domain
//! - Apply the namespace allow-list
//!
//! # Recognised patterns
//! ```text
//! {service}.{namespace}.svc.{env}.{base_domain}   (needs >= 5 segments)
//! {service}.{namespace}.{domain}                  (fallback, >= 3 segments)
//! ```
//!
//! # Design Decisions
//! - Most specific pattern wins when the segment count permits it
//! - Allow-list matching is exact and case-sensitive, no wildcards
//! - Pure: no I/O, only debug logging of rejections

use crate::routing::route::{Route, RouteRejection};

/// Literal marker at index 2 selecting the long pattern.
const SVC_MARKER: &str = "svc";

/// Turns a hostname into a [`Route`].
pub trait RouteDecoder: Send + Sync + std::fmt::Debug {
    fn decode(&self, hostname: &str) -> Route;
}

/// Decoder for the two structured hostname patterns.
#[derive(Debug, Clone)]
pub struct HostnameDecoder {
    default_env: String,
    allowed_namespaces: Vec<String>,
}

impl HostnameDecoder {
    /// Create a decoder. An empty allow-list admits every namespace.
    pub fn new(default_env: impl Into<String>, allowed_namespaces: Vec<String>) -> Self {
        Self {
            default_env: default_env.into(),
            allowed_namespaces,
        }
    }

    pub fn default_env(&self) -> &str {
        &self.default_env
    }

    pub fn allowed_namespaces(&self) -> &[String] {
        &self.allowed_namespaces
    }

    fn is_allowed(&self, namespace: &str) -> bool {
        self.allowed_namespaces.is_empty()
            || self.allowed_namespaces.iter().any(|ns| ns == namespace)
    }
}

impl RouteDecoder for HostnameDecoder {
    fn decode(&self, hostname: &str) -> Route {
        let mut parts: Vec<&str> = hostname.split('.').collect();

        // `split` always yields at least one segment.
        if let Some((head, _port)) = parts[0].split_once(':') {
            parts[0] = head;
        }

        if parts.len() < 3 {
            tracing::debug!(hostname = %hostname, "Invalid hostname format (too few parts)");
            return Route::rejected(RouteRejection::TooFewParts);
        }

        let route = if parts.len() >= 5 && parts[2] == SVC_MARKER {
            Route {
                service: parts[0].to_string(),
                namespace: parts[1].to_string(),
                environment: parts[3].to_string(),
                base_domain: parts[4..].join("."),
                rejection: None,
            }
        } else {
            Route {
                service: parts[0].to_string(),
                namespace: parts[1].to_string(),
                environment: self.default_env.clone(),
                base_domain: parts[2..].join("."),
                rejection: None,
            }
        };

        if !self.is_allowed(&route.namespace) {
            tracing::debug!(
                hostname = %hostname,
                namespace = %route.namespace,
                "Namespace not in allowed list"
            );
            return Route {
                rejection: Some(RouteRejection::NamespaceNotAllowed),
                ..route
            };
        }

        route
    }
}
