//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → optional TOML file (loader.rs)
//!     → environment overlay (loader.rs)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → handed by value/Arc to constructors
//! ```
//!
//! # Design Decisions
//! - Config is read once at start-up and never mutated afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, load_config, ConfigError};
pub use schema::{
    CacheConfig, DiscoveryConfig, HealthCheckConfig, ListenerConfig, ObservabilityConfig,
    ProxyConfig, RoutingConfig, TimeoutConfig,
};
