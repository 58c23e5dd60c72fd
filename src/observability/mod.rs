//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured log lines with a request id)
//!     → metrics.rs (counters, histogram)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The request id flows through every log event for a request
//! - Metrics are cheap (atomic increments) and label cardinality is
//!   bounded by the closed outcome taxonomy
//! - Client-facing 500s stay generic; full fault detail goes to the log

pub mod metrics;
