//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits and timeouts nonzero)
//! - Check addresses parse before anything tries to bind them
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before a config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// Human-readable description of the problem.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration for semantic problems.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address",
            message: format!("not a valid socket address: {:?}", config.listener.bind_address),
        });
    }

    if config.rate_limit.enabled {
        if config.rate_limit.max_requests == 0 {
            errors.push(ValidationError {
                field: "rate_limit.max_requests",
                message: "must be at least 1 when rate limiting is enabled".to_string(),
            });
        }
        if config.rate_limit.window_secs == 0 {
            errors.push(ValidationError {
                field: "rate_limit.window_secs",
                message: "must be at least 1 when rate limiting is enabled".to_string(),
            });
        }
        if config.rate_limit.sweep_interval_secs == 0 {
            errors.push(ValidationError {
                field: "rate_limit.sweep_interval_secs",
                message: "must be at least 1 when rate limiting is enabled".to_string(),
            });
        }
    }

    if config.fetch.timeout_secs == 0 {
        errors.push(ValidationError {
            field: "fetch.timeout_secs",
            message: "must be at least 1".to_string(),
        });
    }
    if config.fetch.max_body_bytes == 0 {
        errors.push(ValidationError {
            field: "fetch.max_body_bytes",
            message: "must be at least 1".to_string(),
        });
    }
    if config.fetch.user_agent.trim().is_empty() {
        errors.push(ValidationError {
            field: "fetch.user_agent",
            message: "must not be empty".to_string(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError {
            field: "observability.metrics_address",
            message: format!(
                "not a valid socket address: {:?}",
                config.observability.metrics_address
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
