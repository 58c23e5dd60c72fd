//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, routing, CORS layers)
//!     → gate (client key + rate limit + body shape)
//!     → [validate] (target URL checks)
//!     → [fetch] (bounded outbound GET)
//!     → response.rs (translate outcome to status + JSON body)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use response::{ErrorBody, FetchEnvelope, GatewayError};
pub use server::HttpServer;
