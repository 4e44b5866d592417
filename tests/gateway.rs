//! End-to-end tests against a live gateway on a local port.

mod common;

use std::time::Duration;

use common::{
    client, closed_port, stand_in, start_echo_backend, start_programmable_backend, Gateway,
};
use ingress_router::config::ProxyConfig;
use reqwest::header::HOST;
use reqwest::StatusCode;

fn config() -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.routing.base_domain = "example.com".into();
    config.routing.default_env = "staging".into();
    config
}

#[tokio::test]
async fn test_forwards_and_tags_response() {
    let backend = start_echo_backend().await;
    let gateway = Gateway::start(config(), stand_in(backend)).await;

    let res = client()
        .get(gateway.url("/api/items?limit=5"))
        .header(HOST, "checkout.orders.example.com")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let headers = res.headers().clone();
    assert_eq!(headers["x-proxy-service"], "checkout");
    assert_eq!(headers["x-proxy-namespace"], "orders");
    assert_eq!(headers["x-proxy-target"], format!("http://{}", backend).as_str());
    assert!(headers.contains_key("x-request-id"));

    let echoed = res.text().await.unwrap().to_ascii_lowercase();
    assert!(echoed.starts_with("get /api/items?limit=5 http/1.1"));
    assert!(echoed.contains("host: checkout.orders.example.com"));
    assert!(echoed.contains("x-forwarded-for: 127.0.0.1"));
    assert!(echoed.contains("x-forwarded-proto: http"));
}

#[tokio::test]
async fn test_pattern_a_hostname() {
    let backend = start_echo_backend().await;
    let gateway = Gateway::start(config(), stand_in(backend)).await;

    let res = client()
        .get(gateway.url("/"))
        .header(HOST, "checkout.orders.svc.prod.example.com")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-proxy-service"], "checkout");
    assert_eq!(res.headers()["x-proxy-namespace"], "orders");
}

#[tokio::test]
async fn test_malformed_hostname_is_bad_request() {
    let backend = start_echo_backend().await;
    let gateway = Gateway::start(config(), stand_in(backend)).await;

    let res = client()
        .get(gateway.url("/"))
        .header(HOST, "localhost")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(!res.headers().contains_key("x-proxy-service"));
    assert_eq!(res.text().await.unwrap(), "Invalid hostname format");
}

#[tokio::test]
async fn test_namespace_outside_allow_list() {
    let backend = start_echo_backend().await;
    let mut config = config();
    config.routing.allowed_namespaces = vec!["orders".into(), "billing".into()];
    let gateway = Gateway::start(config, stand_in(backend)).await;

    let denied = client()
        .get(gateway.url("/"))
        .header(HOST, "api.payments.example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::BAD_REQUEST);

    let allowed = client()
        .get(gateway.url("/"))
        .header(HOST, "ledger.billing.example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_namespace_is_answered_locally() {
    let gateway = Gateway::start(config(), stand_in(closed_port().await)).await;

    let res = client()
        .get(gateway.url("/anything"))
        .header(HOST, "anything.health.anything")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(!res.headers().contains_key("x-proxy-target"));
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_local_endpoints() {
    let gateway = Gateway::start(config(), stand_in(closed_port().await)).await;

    for path in ["/health", "/healthz"] {
        let res = client().get(gateway.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
    }

    let routes: serde_json::Value = client()
        .get(gateway.url("/routes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(routes["config"]["base_domain"], "example.com");
    assert_eq!(routes["config"]["default_env"], "staging");
    assert_eq!(
        routes["patterns"][0],
        "{service}.{namespace}.svc.{env}.{base_domain}"
    );
}

#[tokio::test]
async fn test_unreachable_backend_is_bad_gateway() {
    let gateway = Gateway::start(config(), stand_in(closed_port().await)).await;

    let res = client()
        .get(gateway.url("/"))
        .header(HOST, "checkout.orders.example.com")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(res.text().await.unwrap(), "Service temporarily unavailable");
}

#[tokio::test]
async fn test_backend_status_passes_through() {
    let backend = start_programmable_backend(|_| async { (503, "draining".to_string()) }).await;
    let gateway = Gateway::start(config(), stand_in(backend)).await;

    let res = client()
        .get(gateway.url("/"))
        .header(HOST, "checkout.orders.example.com")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.headers()["x-proxy-service"], "checkout");
    assert_eq!(res.text().await.unwrap(), "draining");
}

#[tokio::test]
async fn test_slow_backend_hits_write_timeout() {
    let backend = start_programmable_backend(|_| async {
        tokio::time::sleep(Duration::from_secs(2)).await;
        (200, "late".to_string())
    })
    .await;
    let mut config = config();
    config.timeouts.write = Duration::from_millis(200);
    let gateway = Gateway::start(config, stand_in(backend)).await;

    let res = client()
        .get(gateway.url("/"))
        .header(HOST, "checkout.orders.example.com")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_shutdown_stops_server() {
    let gateway = Gateway::start(config(), stand_in(closed_port().await)).await;
    let res = client().get(gateway.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    gateway.shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), gateway.handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}
