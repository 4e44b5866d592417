//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Host header
//!     → decoder.rs (hostname → Route, allow-list)
//!     → dispatcher.rs (resolve, health gate, forward)
//!     → backend response or exactly one error response
//! ```
//!
//! # Design Decisions
//! - Decoding is pure and deterministic: same hostname, same Route
//! - A Route is request-local and never shared or mutated
//! - No regex in the hot path (segment splitting only)

pub mod decoder;
pub mod dispatcher;
pub mod route;

pub use decoder::{HostnameDecoder, RouteDecoder};
pub use dispatcher::{Decision, Dispatcher, Outcome, HEALTH_NAMESPACE};
pub use route::{Route, RouteRejection};
