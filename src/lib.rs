//! Hardened URL-Fetch Gateway Library

pub mod config;
pub mod fetch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod validate;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
