//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Per-request access logs come from http::logging, a layer wrapped
//! around the dispatcher rather than code inside it.
//! ```

pub mod logging;
pub mod metrics;
