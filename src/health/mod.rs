//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Periodic timer (probe.rs)
//!     → evict expired cache entries
//!     → ServiceResolver::health_check on every cached target
//!     → write healthy/last_checked_at back into the cache
//!     → dispatcher sees the flag on its next cache hit (503 when false)
//! ```
//!
//! # Design Decisions
//! - Health is never checked on the request path
//! - The probe only has something to do when the resolution cache is on

pub mod probe;

pub use probe::{HealthProbe, ProbeReport};
