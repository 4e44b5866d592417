//! Request-level routing errors.
//!
//! Every failure the dispatcher can hit maps to exactly one status code;
//! the response body is a short plain-text reason.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::resolver::ResolveError;
use crate::routing::RouteRejection;

#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    /// Hostname did not decode or its namespace is not allowed.
    #[error("malformed route: {0}")]
    MalformedRoute(RouteRejection),

    /// Discovery has no such service, or could not be asked.
    #[error("service unresolvable: {0}")]
    ServiceUnresolvable(#[from] ResolveError),

    /// Resolved target is marked unhealthy.
    #[error("target {service}.{namespace} is unhealthy")]
    TargetUnhealthy { namespace: String, service: String },

    /// The exchange with the backend failed.
    #[error("forwarding to {target} failed: {reason}")]
    ForwardingFailure { target: String, reason: String },
}

impl RoutingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RoutingError::MalformedRoute(_) => StatusCode::BAD_REQUEST,
            RoutingError::ServiceUnresolvable(_) => StatusCode::NOT_FOUND,
            RoutingError::TargetUnhealthy { .. } => StatusCode::SERVICE_UNAVAILABLE,
            RoutingError::ForwardingFailure { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RoutingError::MalformedRoute(_) => "malformed_route",
            RoutingError::ServiceUnresolvable(_) => "service_unresolvable",
            RoutingError::TargetUnhealthy { .. } => "target_unhealthy",
            RoutingError::ForwardingFailure { .. } => "forwarding_failure",
        }
    }

    /// Client-facing text; discovery details stay in the logs.
    fn public_message(&self) -> &'static str {
        match self {
            RoutingError::MalformedRoute(_) => "Invalid hostname format",
            RoutingError::ServiceUnresolvable(_) => "Service not found",
            RoutingError::TargetUnhealthy { .. } => "Service unavailable",
            RoutingError::ForwardingFailure { .. } => "Service temporarily unavailable",
        }
    }
}

impl IntoResponse for RoutingError {
    fn into_response(self) -> Response {
        (self.status_code(), self.public_message()).into_response()
    }
}
