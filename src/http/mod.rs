//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (net::Listener)
//!     → server.rs (hyper-util connection, Axum router, middleware)
//!     → handlers.rs (/health, /healthz, /routes)
//!       or routing::Dispatcher (every other path)
//!     → forward.rs (upstream exchange, headers.rs rewrites)
//!     → Send to client
//! ```

pub mod forward;
pub mod handlers;
pub mod headers;
pub mod logging;
pub mod server;

pub use forward::Forwarder;
pub use handlers::{HealthStatus, RoutesInfo};
pub use server::{AppState, HttpServer};
