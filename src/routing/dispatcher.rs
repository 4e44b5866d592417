//! Routing dispatcher: the per-request pipeline.
//!
//! # Data Flow
//! ```text
//! Host header
//!     → decoder            invalid        → 400
//!     → namespace "health"                → liveness response
//!     → cache / resolver   failed/timeout → 404
//!     → target.healthy     false          → 503
//!     → forwarder          transport err  → 502
//!     → backend response + X-Proxy-* tags
//! ```
//!
//! # Design Decisions
//! - Every failure is terminal, logged once here, and becomes one response
//! - Resolution runs under a fixed budget; the discovery query is dropped
//!   (cancelled) when the budget runs out
//! - The cache is optional; without it every request resolves afresh

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::RoutingError;
use crate::http::forward::Forwarder;
use crate::http::handlers::HealthStatus;
use crate::http::server::peer_addr;
use crate::observability::metrics;
use crate::resolver::{BackendTarget, ResolutionCache, ResolveError, ServiceResolver};
use crate::routing::decoder::RouteDecoder;
use crate::routing::route::Route;

/// Namespace reserved for the gateway's own liveness check.
pub const HEALTH_NAMESPACE: &str = "health";

/// Outcome label attached to dispatcher responses for request metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome(pub &'static str);

/// What to do with a request once its hostname has been looked at.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Answer with the gateway's own liveness status.
    Liveness,
    /// Forward to this healthy target.
    Forward(BackendTarget),
}

#[derive(Debug)]
pub struct Dispatcher {
    decoder: Arc<dyn RouteDecoder>,
    resolver: Arc<ServiceResolver>,
    cache: Option<ResolutionCache>,
    forwarder: Forwarder,
    resolve_budget: Duration,
}

impl Dispatcher {
    pub fn new(
        decoder: Arc<dyn RouteDecoder>,
        resolver: Arc<ServiceResolver>,
        forwarder: Forwarder,
        resolve_budget: Duration,
    ) -> Self {
        Self {
            decoder,
            resolver,
            cache: None,
            forwarder,
            resolve_budget,
        }
    }

    /// Serve fresh resolutions from `cache` and store new ones in it.
    pub fn with_cache(mut self, cache: ResolutionCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&ResolutionCache> {
        self.cache.as_ref()
    }

    pub fn resolver(&self) -> &Arc<ServiceResolver> {
        &self.resolver
    }

    /// Steps 1-4 of the pipeline: everything short of forwarding.
    pub async fn decide(&self, hostname: &str) -> Result<Decision, RoutingError> {
        let route = self.decoder.decode(hostname);
        if let Some(reason) = route.rejection.clone() {
            return Err(RoutingError::MalformedRoute(reason));
        }

        if route.namespace == HEALTH_NAMESPACE {
            return Ok(Decision::Liveness);
        }

        let target = self.lookup(&route).await?;
        if !target.healthy {
            return Err(RoutingError::TargetUnhealthy {
                namespace: target.namespace,
                service: target.service,
            });
        }

        Ok(Decision::Forward(target))
    }

    /// A fresh cached target, or a new resolution within the budget.
    pub async fn lookup(&self, route: &Route) -> Result<BackendTarget, ResolveError> {
        if let Some(target) = self
            .cache
            .as_ref()
            .and_then(|cache| cache.get(&route.namespace, &route.service))
        {
            metrics::record_resolution("hit");
            return Ok(target);
        }

        let resolution = self.resolver.resolve(route);
        let target = match tokio::time::timeout(self.resolve_budget, resolution).await {
            Ok(Ok(target)) => target,
            Ok(Err(e)) => {
                metrics::record_resolution(if e.is_absent() { "not_found" } else { "error" });
                return Err(e);
            }
            Err(_) => {
                metrics::record_resolution("timeout");
                return Err(ResolveError::TimedOut(self.resolve_budget));
            }
        };

        metrics::record_resolution("resolved");
        if let Some(cache) = &self.cache {
            cache.insert(target.clone());
        }
        Ok(target)
    }

    /// Run the whole pipeline for one request.
    pub async fn dispatch(&self, request: Request<Body>) -> Response {
        let context = RequestContext::from_request(&request);

        let outcome = match self.decide(&context.host).await {
            Ok(Decision::Liveness) => Ok((Json(HealthStatus::now()).into_response(), "liveness")),
            Ok(Decision::Forward(target)) => self
                .forwarder
                .forward(request, &target, context.client_addr)
                .await
                .map(|response| (response, "forwarded")),
            Err(e) => Err(e),
        };

        let (mut response, label) = match outcome {
            Ok(done) => done,
            Err(e) => {
                context.log_failure(&e);
                let label = e.kind();
                (e.into_response(), label)
            }
        };

        response.extensions_mut().insert(Outcome(label));
        response
    }
}

/// Request details carried into failure logs.
struct RequestContext {
    client_addr: Option<SocketAddr>,
    method: String,
    path: String,
    host: String,
}

impl RequestContext {
    fn from_request(request: &Request<Body>) -> Self {
        let host = request
            .headers()
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| request.uri().authority().map(|a| a.as_str()))
            .unwrap_or_default()
            .to_string();

        Self {
            client_addr: peer_addr(request),
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            host,
        }
    }

    fn remote(&self) -> String {
        self.client_addr
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "-".to_string())
    }

    fn log_failure(&self, err: &RoutingError) {
        let remote = self.remote();
        match err {
            RoutingError::MalformedRoute(reason) => tracing::warn!(
                remote_addr = %remote, method = %self.method, path = %self.path, host = %self.host,
                reason = %reason,
                "Invalid hostname"
            ),
            RoutingError::ServiceUnresolvable(e) if e.is_absent() => tracing::warn!(
                remote_addr = %remote, method = %self.method, path = %self.path, host = %self.host,
                error = %e,
                "Service not found"
            ),
            RoutingError::ServiceUnresolvable(e) => tracing::error!(
                remote_addr = %remote, method = %self.method, path = %self.path, host = %self.host,
                error = %e,
                "Service resolution failed"
            ),
            RoutingError::TargetUnhealthy { namespace, service } => tracing::warn!(
                remote_addr = %remote, method = %self.method, path = %self.path, host = %self.host,
                namespace = %namespace, service = %service,
                "Target unhealthy"
            ),
            RoutingError::ForwardingFailure { target, reason } => tracing::error!(
                remote_addr = %remote, method = %self.method, path = %self.path, host = %self.host,
                target = %target, reason = %reason,
                "Forwarding failed"
            ),
        }
    }
}
