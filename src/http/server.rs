//! HTTP server setup and connection serving.
//!
//! # Responsibilities
//! - Create the Axum router: local endpoints plus the dispatcher fallback
//! - Wire up middleware (tracing, request id, logging, response deadline)
//! - Serve HTTP/1.1 and h2c connections accepted by the bounded listener
//! - Drain in-flight connections on shutdown, up to a deadline
//! - Spawn the health probe when the resolution cache is on

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware,
    response::Response,
    routing::any,
    Router,
};
use hyper::body::Incoming;
use hyper_util::{
    rt::{TokioExecutor, TokioIo, TokioTimer},
    server::{conn::auto, graceful::GracefulShutdown},
};
use tokio::sync::broadcast;
use tower::ServiceExt;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::health::HealthProbe;
use crate::http::forward::Forwarder;
use crate::http::handlers::{self, RoutesInfo};
use crate::http::logging::log_requests;
use crate::net::{ConnectionTracker, Listener, ListenerError};
use crate::resolver::{ResolutionCache, ServiceResolver};
use crate::routing::{Dispatcher, HostnameDecoder};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub routes: Arc<RoutesInfo>,
}

/// The gateway's HTTP front end.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    dispatcher: Arc<Dispatcher>,
}

impl HttpServer {
    pub fn new(config: ProxyConfig, resolver: ServiceResolver) -> Self {
        let routing = &config.routing;
        let decoder = Arc::new(HostnameDecoder::new(
            routing.default_env.clone(),
            routing.allowed_namespaces.clone(),
        ));

        let mut dispatcher = Dispatcher::new(
            decoder,
            Arc::new(resolver),
            Forwarder::new(config.timeouts.idle),
            config.timeouts.resolve,
        );
        if config.cache.enabled {
            dispatcher = dispatcher.with_cache(ResolutionCache::new());
        }
        let dispatcher = Arc::new(dispatcher);

        let state = AppState {
            dispatcher: Arc::clone(&dispatcher),
            routes: Arc::new(RoutesInfo::new(
                &routing.base_domain,
                &routing.default_env,
                &routing.allowed_namespaces,
            )),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            dispatcher,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", any(handlers::health))
            .route("/healthz", any(handlers::health))
            .route("/routes", any(handlers::routes))
            .fallback(dispatch)
            .with_state(state)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::GATEWAY_TIMEOUT,
                config.timeouts.write,
            ))
            // Outside the deadline so timed-out requests are still logged.
            .layer(middleware::from_fn(log_requests))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// The resolution cache, when enabled.
    pub fn cache(&self) -> Option<&ResolutionCache> {
        self.dispatcher.cache()
    }

    /// The probe for this server's cache, when both are enabled.
    pub fn health_probe(&self) -> Option<HealthProbe> {
        if !self.config.health_check.enabled {
            return None;
        }
        let cache = self.dispatcher.cache()?.clone();
        Some(HealthProbe::new(
            Arc::clone(self.dispatcher.resolver()),
            cache,
            self.config.health_check.interval,
            self.config.timeouts.resolve,
        ))
    }

    /// Serve connections from `listener` until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(address = %addr, "HTTP server starting");
        }

        if let Some(probe) = self.health_probe() {
            tokio::spawn(probe.run(shutdown.resubscribe()));
        } else if self.config.health_check.enabled {
            tracing::warn!("Health probe requested but the resolution cache is disabled");
        }

        let mut builder = auto::Builder::new(TokioExecutor::new());
        builder
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(self.config.timeouts.read);

        let graceful = GracefulShutdown::new();
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, remote_addr, permit) = match accepted {
                        Ok(accepted) => accepted,
                        Err(ListenerError::Accept(e)) => {
                            tracing::warn!(error = %e, "Accept failed");
                            continue;
                        }
                        Err(e) => return Err(e),
                    };

                    let guard = tracker.track();
                    let router = self.router.clone();
                    let service = hyper::service::service_fn(move |mut request: Request<Incoming>| {
                        request.extensions_mut().insert(ConnectInfo(remote_addr));
                        router.clone().oneshot(request)
                    });

                    let connection = builder
                        .serve_connection_with_upgrades(TokioIo::new(stream), service)
                        .into_owned();
                    let connection = graceful.watch(connection);

                    tokio::spawn(async move {
                        if let Err(e) = connection.await {
                            tracing::debug!(
                                connection_id = %guard.id(),
                                peer_addr = %remote_addr,
                                error = %e,
                                "Connection ended with error"
                            );
                        }
                        drop(permit);
                        drop(guard);
                    });
                }
                _ = shutdown.recv() => {
                    tracing::info!("HTTP server received shutdown signal");
                    break;
                }
            }
        }

        drop(listener);
        tracing::info!(
            active_connections = tracker.active_count(),
            deadline = ?self.config.timeouts.shutdown,
            "Draining connections"
        );

        match tokio::time::timeout(self.config.timeouts.shutdown, graceful.shutdown()).await {
            Ok(()) => tracing::info!("HTTP server stopped"),
            Err(_) => tracing::warn!(
                remaining = tracker.active_count(),
                "Drain deadline elapsed, closing remaining connections"
            ),
        }
        Ok(())
    }
}

/// Catch-all route: everything that is not a local endpoint.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.dispatcher.dispatch(request).await
}

/// Peer address attached by the accept loop.
pub fn peer_addr(request: &Request<Body>) -> Option<SocketAddr> {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr)
}
