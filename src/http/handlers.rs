//! Gateway-local endpoints: liveness and route discovery.

use axum::{extract::State, response::IntoResponse, Json};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::http::server::AppState;

/// The hostname shapes the decoder accepts, as advertised on `/routes`.
pub const ROUTE_PATTERNS: [&str; 2] = [
    "{service}.{namespace}.svc.{env}.{base_domain}",
    "{service}.{namespace}.{domain}",
];

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
}

impl HealthStatus {
    pub fn now() -> Self {
        Self {
            status: "healthy",
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Gateway settings that shape routing, as served on `/routes`.
#[derive(Debug, Clone, Serialize)]
pub struct RoutesInfo {
    pub config: RoutingSummary,
    pub patterns: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutingSummary {
    pub base_domain: String,
    pub default_env: String,
    pub allowed_namespaces: Vec<String>,
}

impl RoutesInfo {
    pub fn new(base_domain: &str, default_env: &str, allowed_namespaces: &[String]) -> Self {
        Self {
            config: RoutingSummary {
                base_domain: base_domain.to_string(),
                default_env: default_env.to_string(),
                allowed_namespaces: allowed_namespaces.to_vec(),
            },
            patterns: ROUTE_PATTERNS.to_vec(),
        }
    }
}

/// `/health` and `/healthz`; also answers hostnames in the `health` namespace.
pub async fn health() -> impl IntoResponse {
    Json(HealthStatus::now())
}

pub async fn routes(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.routes.as_ref().clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_timestamp_is_rfc3339() {
        let status = HealthStatus::now();
        assert_eq!(status.status, "healthy");
        assert!(chrono::DateTime::parse_from_rfc3339(&status.timestamp).is_ok());
    }

    #[test]
    fn test_routes_shape() {
        let info = RoutesInfo::new("example.com", "prod", &["orders".to_string()]);
        let json = serde_json::to_value(&info).unwrap();

        assert_eq!(json["config"]["base_domain"], "example.com");
        assert_eq!(json["config"]["default_env"], "prod");
        assert_eq!(json["config"]["allowed_namespaces"][0], "orders");
        assert_eq!(json["patterns"].as_array().unwrap().len(), 2);
    }
}
