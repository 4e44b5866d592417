//! Forwarding primitive.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the target's scheme and authority
//! - Preserve the client's Host header
//! - Stream bodies in both directions without buffering
//! - Tag the backend's response with the routing decision
//!
//! # Design Decisions
//! - One pooled client shared by every request; idle connections are
//!   closed after the configured idle timeout
//! - A transport error is terminal for the request (no retries)

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, Response, Uri, Version},
};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::{TokioExecutor, TokioTimer},
};

use crate::error::RoutingError;
use crate::http::headers;
use crate::net::tls;
use crate::resolver::BackendTarget;

type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Shared forwarding client.
#[derive(Clone)]
pub struct Forwarder {
    client: UpstreamClient,
}

impl std::fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forwarder").finish_non_exhaustive()
    }
}

impl Forwarder {
    pub fn new(idle_timeout: Duration) -> Self {
        tls::install_crypto_provider();
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .build();

        let client = Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(idle_timeout)
            .build(connector);

        Self { client }
    }

    /// Send `request` to `target` and hand back the backend's response.
    pub async fn forward(
        &self,
        request: Request<Body>,
        target: &BackendTarget,
        client_addr: Option<SocketAddr>,
    ) -> Result<Response<Body>, RoutingError> {
        let origin = target.origin();
        let (mut parts, body) = request.into_parts();

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        parts.uri = format!("{}{}", origin, path_and_query)
            .parse::<Uri>()
            .map_err(|e| RoutingError::ForwardingFailure {
                target: origin.clone(),
                reason: format!("invalid upstream URI: {}", e),
            })?;
        // The upstream connection negotiates its own protocol.
        parts.version = Version::HTTP_11;

        headers::strip_hop_by_hop(&mut parts.headers);
        headers::append_forwarded(&mut parts.headers, client_addr.map(|a| a.ip()), "http");

        let response = self
            .client
            .request(Request::from_parts(parts, body))
            .await
            .map_err(|e| RoutingError::ForwardingFailure {
                target: origin.clone(),
                reason: e.to_string(),
            })?;

        let (mut parts, body) = response.into_parts();
        headers::strip_hop_by_hop(&mut parts.headers);
        headers::tag_response(&mut parts.headers, target);

        Ok(Response::from_parts(parts, Body::new(body)))
    }
}
