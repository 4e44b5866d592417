//! Decoded routing intent.

use serde::Serialize;

/// Why a hostname did not produce a usable route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteRejection {
    /// Fewer than three dot-separated segments.
    TooFewParts,
    /// Namespace is not in the configured allow-list.
    NamespaceNotAllowed,
}

impl std::fmt::Display for RouteRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteRejection::TooFewParts => write!(f, "too few parts"),
            RouteRejection::NamespaceNotAllowed => write!(f, "namespace not allowed"),
        }
    }
}

/// The routing intent carried by a request's hostname.
///
/// Built fresh by the decoder for each request and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Route {
    pub service: String,
    pub namespace: String,
    pub environment: String,
    /// Remaining domain suffix, informational only.
    pub base_domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<RouteRejection>,
}

impl Route {
    /// A route that failed decoding or validation.
    pub fn rejected(reason: RouteRejection) -> Self {
        Self {
            rejection: Some(reason),
            ..Self::default()
        }
    }

    /// True when decoding and allow-list checks both succeeded.
    pub fn is_valid(&self) -> bool {
        self.rejection.is_none()
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.rejection {
            None => write!(
                f,
                "{}.{} (env={}, domain={})",
                self.service, self.namespace, self.environment, self.base_domain
            ),
            Some(reason) => write!(f, "invalid route ({})", reason),
        }
    }
}
