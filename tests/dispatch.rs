//! Router-level tests against the cluster resolver and an in-memory registry.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header::HOST, Request, StatusCode};
use ingress_router::config::ProxyConfig;
use ingress_router::discovery::{InMemoryDiscovery, PortSpec};
use ingress_router::http::HttpServer;
use ingress_router::resolver::{BackendTarget, ClusterResolver, ServiceResolver};
use tower::ServiceExt;
use url::Url;

fn cluster(discovery: Arc<InMemoryDiscovery>) -> ServiceResolver {
    ServiceResolver::Cluster(ClusterResolver::new(discovery, "svc.cluster.local"))
}

fn request(host: &str) -> Request<Body> {
    Request::builder()
        .uri("/orders/42")
        .header(HOST, host)
        .body(Body::empty())
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_absent_service_is_not_found() {
    let discovery = Arc::new(InMemoryDiscovery::new());
    let server = HttpServer::new(ProxyConfig::default(), cluster(discovery));

    let response = server
        .router()
        .oneshot(request("ghost.orders.example.com"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Service not found");
}

#[tokio::test]
async fn test_discovery_outage_is_not_found() {
    let discovery = Arc::new(InMemoryDiscovery::new());
    discovery.register("orders", "checkout", vec![PortSpec::new(80)]);
    discovery.set_failing(true);
    let server = HttpServer::new(ProxyConfig::default(), cluster(discovery));

    let response = server
        .router()
        .oneshot(request("checkout.orders.example.com"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn test_slow_discovery_is_not_found() {
    let discovery = Arc::new(InMemoryDiscovery::new());
    discovery.register("orders", "checkout", vec![PortSpec::new(80)]);
    discovery.set_latency(Some(Duration::from_secs(5)));

    let mut config = ProxyConfig::default();
    config.timeouts.resolve = Duration::from_millis(100);
    let server = HttpServer::new(config, cluster(discovery));

    let response = tokio::time::timeout(
        Duration::from_secs(2),
        server.router().oneshot(request("checkout.orders.example.com")),
    )
    .await
    .expect("resolution budget not enforced")
    .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_namespace_never_queries_discovery() {
    let discovery = Arc::new(InMemoryDiscovery::new());
    let server = HttpServer::new(ProxyConfig::default(), cluster(discovery.clone()));

    let response = server
        .router()
        .oneshot(request("anything.health.anything"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("\"healthy\""));
    assert_eq!(discovery.query_count(), 0);
}

#[tokio::test]
async fn test_probe_marks_target_unavailable() {
    let discovery = Arc::new(InMemoryDiscovery::new());
    let mut config = ProxyConfig::default();
    config.cache.enabled = true;
    config.health_check.enabled = true;
    let server = HttpServer::new(config, cluster(discovery.clone()));

    // Resolved earlier; the service has since been removed from the registry.
    let cache = server.cache().unwrap();
    cache.insert(BackendTarget::new(
        "checkout",
        "orders",
        Url::parse("http://checkout.orders.svc.cluster.local:80").unwrap(),
    ));

    let report = server.health_probe().unwrap().check_all().await;
    assert_eq!(report.unhealthy, 1);

    let response = server
        .router()
        .oneshot(request("checkout.orders.example.com"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_text(response).await, "Service unavailable");
}

#[tokio::test]
async fn test_probe_requires_cache() {
    let mut config = ProxyConfig::default();
    config.health_check.enabled = true;
    let server = HttpServer::new(config, cluster(Arc::new(InMemoryDiscovery::new())));

    assert!(server.cache().is_none());
    assert!(server.health_probe().is_none());
}
