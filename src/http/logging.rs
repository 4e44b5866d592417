//! Request logging middleware.
//!
//! Wraps every route (local endpoints and the dispatcher alike) and emits a
//! start/completion pair carrying the client address, method, path and host.
//! Request metrics are recorded here too, labelled with the dispatcher's
//! [`Outcome`] when there is one. The middleware sits outside the write
//! deadline, so a request cut off by it is logged as a `timeout`.

use std::time::Instant;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::http::server::peer_addr;
use crate::observability::metrics;
use crate::routing::dispatcher::Outcome;

pub async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let remote_addr = peer_addr(&request)
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "-".to_string());
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| request.uri().host())
        .unwrap_or_default()
        .to_string();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    tracing::info!(
        request_id = %request_id,
        remote_addr = %remote_addr,
        method = %method,
        path = %path,
        host = %host,
        "Request started"
    );

    let response = next.run(request).await;

    tracing::info!(
        request_id = %request_id,
        remote_addr = %remote_addr,
        method = %method,
        path = %path,
        host = %host,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    let outcome = response
        .extensions()
        .get::<Outcome>()
        .map(|Outcome(label)| *label)
        .unwrap_or(if response.status() == StatusCode::GATEWAY_TIMEOUT {
            "timeout"
        } else {
            "local"
        });
    metrics::record_request(method.as_str(), response.status().as_u16(), outcome, start);

    response
}
