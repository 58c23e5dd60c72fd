//! HTTP server setup and request pipeline.
//!
//! # Responsibilities
//! - Create the Axum router with the fetch and preflight handlers
//! - Attach the permissive CORS headers to every response
//! - Run the gate → validate → fetch → translate pipeline per request
//! - Spawn the rate-limiter sweeper alongside the server
//! - Serve with graceful shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::fetch::{FetchError, FetchExecutor};
use crate::http::response::{FetchEnvelope, GatewayError};
use crate::observability::metrics;
use crate::security::client_key::client_key;
use crate::security::rate_limit::{run_sweeper, FixedWindowLimiter};
use crate::validate::validate_url;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<FixedWindowLimiter>,
    pub executor: Arc<FetchExecutor>,
    pub config: Arc<GatewayConfig>,
}

/// HTTP server for the fetch gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    limiter: Arc<FixedWindowLimiter>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails only if the outbound client cannot be constructed.
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let limiter = Arc::new(FixedWindowLimiter::from_config(&config.rate_limit));
        let executor = Arc::new(FetchExecutor::new(&config.fetch)?);

        let state = AppState {
            limiter: limiter.clone(),
            executor,
            config: Arc::new(config.clone()),
        };

        let router = Self::build_router(state);
        Ok(Self {
            router,
            config,
            limiter,
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The CORS headers are set as layers so no handler — success, error,
    /// or preflight — can produce a response without them.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", post(fetch_handler).options(preflight_handler))
            .route("/{*path}", post(fetch_handler).options(preflight_handler))
            .with_state(state)
            .layer(SetResponseHeaderLayer::if_not_present(
                ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("authorization, x-client-info, apikey, content-type"),
            ))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if self.config.rate_limit.enabled {
            let interval = Duration::from_secs(self.config.rate_limit.sweep_interval_secs);
            tokio::spawn(run_sweeper(
                self.limiter.clone(),
                interval,
                shutdown.resubscribe(),
            ));
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main fetch handler: run the pipeline, then translate and record.
async fn fetch_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4();

    match handle_fetch(&state, &headers, &body, request_id).await {
        Ok(envelope) => {
            metrics::record_fetch_outcome("success");
            metrics::record_request(StatusCode::OK.as_u16(), "success", start);
            (StatusCode::OK, Json(envelope)).into_response()
        }
        Err(err) => {
            match &err {
                GatewayError::RateLimited => metrics::record_rate_limited(),
                GatewayError::Fetch(fetch_err) => {
                    metrics::record_fetch_outcome(fetch_err.as_label())
                }
                _ => {}
            }
            log_rejection(&err, request_id);
            metrics::record_request(err.status().as_u16(), err.as_label(), start);
            err.into_response()
        }
    }
}

/// Answer CORS preflight: the header layers do the rest.
async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

/// The per-request pipeline as one linear fallible flow.
///
/// Order is fixed: rate limit, body shape, URL validation, fetch. At most
/// one outbound request happens, and only after both gate and validation
/// pass.
async fn handle_fetch(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
    request_id: Uuid,
) -> Result<FetchEnvelope, GatewayError> {
    let client = client_key(headers);
    if state.config.rate_limit.enabled && !state.limiter.check(&client) {
        tracing::warn!(request_id = %request_id, client = %client, "Rate limit exceeded");
        return Err(GatewayError::RateLimited);
    }

    let raw_url = extract_url(body).ok_or(GatewayError::BadRequest)?;

    let target = validate_url(&raw_url, state.config.validation.block_internal)?;

    tracing::debug!(request_id = %request_id, client = %client, url = %target, "Fetching URL");

    let result = state.executor.fetch(&target, &raw_url).await?;

    tracing::debug!(
        request_id = %request_id,
        bytes = result.body.len(),
        "Fetch completed"
    );

    Ok(FetchEnvelope::from(result))
}

/// Pull a usable URL out of the request body.
///
/// The body must be JSON with a non-empty string `url` field; whitespace
/// around the value is ignored. Anything else fails the shape check.
fn extract_url(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let url = value.get("url")?.as_str()?.trim();
    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}

/// Log a rejection with detail proportional to its severity.
///
/// Network faults keep their full cause in the server log; the caller
/// only ever sees the generic message.
fn log_rejection(err: &GatewayError, request_id: Uuid) {
    match err {
        GatewayError::Fetch(FetchError::Network(cause)) => {
            tracing::error!(request_id = %request_id, error = %cause, "Fetch failed with network error");
        }
        GatewayError::Fetch(fetch_err) => {
            tracing::warn!(request_id = %request_id, error = %fetch_err, "Fetch failed");
        }
        GatewayError::Validation(reason) => {
            tracing::debug!(request_id = %request_id, reason = %reason, "URL validation failed");
        }
        GatewayError::BadRequest | GatewayError::RateLimited => {
            tracing::debug!(request_id = %request_id, error = %err, "Request rejected at the gate");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_url_accepts_a_trimmed_string_field() {
        assert_eq!(
            extract_url(br#"{"url": "  https://example.com  "}"#),
            Some("https://example.com".to_string())
        );
    }

    #[test]
    fn extract_url_rejects_missing_or_wrong_shapes() {
        assert_eq!(extract_url(b"{}"), None);
        assert_eq!(extract_url(br#"{"url": ""}"#), None);
        assert_eq!(extract_url(br#"{"url": "   "}"#), None);
        assert_eq!(extract_url(br#"{"url": 42}"#), None);
        assert_eq!(extract_url(br#"{"url": null}"#), None);
        assert_eq!(extract_url(br#"{"target": "https://example.com"}"#), None);
        assert_eq!(extract_url(b"not json at all"), None);
        assert_eq!(extract_url(b""), None);
    }
}
