//! Hostname-routed cluster ingress gateway library.

pub mod config;
pub mod discovery;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resolver;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use error::RoutingError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
