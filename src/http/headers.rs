//! Header manipulation for forwarded exchanges.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Add X-Forwarded-For, X-Forwarded-Host, X-Forwarded-Proto
//! - Tag responses with the routing decision
//!
//! # Design Decisions
//! - The client IP is appended to any existing X-Forwarded-For chain
//! - X-Forwarded-Host/Proto are only set when absent so an outer proxy's
//!   values survive

use std::net::IpAddr;

use axum::http::{
    header::{self, HeaderName},
    HeaderMap, HeaderValue,
};

use crate::resolver::BackendTarget;

pub const X_PROXY_SERVICE: HeaderName = HeaderName::from_static("x-proxy-service");
pub const X_PROXY_NAMESPACE: HeaderName = HeaderName::from_static("x-proxy-namespace");
pub const X_PROXY_TARGET: HeaderName = HeaderName::from_static("x-proxy-target");

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

const KEEP_ALIVE: HeaderName = HeaderName::from_static("keep-alive");
const PROXY_CONNECTION: HeaderName = HeaderName::from_static("proxy-connection");

const HOP_BY_HOP: [HeaderName; 9] = [
    header::CONNECTION,
    KEEP_ALIVE,
    PROXY_CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Remove hop-by-hop headers, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Record the client and the original host/scheme for the backend.
pub fn append_forwarded(headers: &mut HeaderMap, client_ip: Option<IpAddr>, proto: &'static str) {
    if let Some(ip) = client_ip {
        let chain = match headers.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(prior) if !prior.trim().is_empty() => format!("{}, {}", prior, ip),
            _ => ip.to_string(),
        };
        if let Ok(value) = HeaderValue::from_str(&chain) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }

    if !headers.contains_key(&X_FORWARDED_HOST) {
        if let Some(host) = headers.get(header::HOST).cloned() {
            headers.insert(X_FORWARDED_HOST, host);
        }
    }
    if !headers.contains_key(&X_FORWARDED_PROTO) {
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static(proto));
    }
}

/// Add the X-Proxy-* headers describing where the request went.
pub fn tag_response(headers: &mut HeaderMap, target: &BackendTarget) {
    let tags = [
        (X_PROXY_SERVICE, target.service.as_str()),
        (X_PROXY_NAMESPACE, target.namespace.as_str()),
    ];
    for (name, value) in tags {
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.insert(name, value);
        }
    }
    if let Ok(value) = HeaderValue::from_str(&target.origin()) {
        headers.insert(X_PROXY_TARGET, value);
    }
}
