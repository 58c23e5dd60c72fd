//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → client_key.rs (identify the caller from forwarding headers)
//!     → rate_limit.rs (fixed-window admission per key)
//!     → Pass to body-shape check and URL validation
//! ```
//!
//! # Design Decisions
//! - Fail closed: a rejected check ends the request before any egress
//! - No trust in client input; the client key is best-effort only
//! - The limiter is injected state, never a process global

pub mod client_key;
pub mod rate_limit;

pub use client_key::{client_key, UNKNOWN_CLIENT};
pub use rate_limit::FixedWindowLimiter;
