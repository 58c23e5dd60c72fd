//! Response translation.
//!
//! # Responsibilities
//! - Map every request outcome to an HTTP status and JSON body
//! - Keep client-facing messages stable; they are part of the contract
//! - Hide internal fault detail behind a generic 500
//!
//! # Design Decisions
//! - The mapping is total over a closed set of tags; no catch-all for
//!   arbitrary runtime faults is needed because every stage returns a
//!   tagged result
//! - Upstream failure statuses are mirrored to the caller, falling back
//!   to 502 when the code is not representable

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::fetch::{FetchError, FetchResult};
use crate::validate::ValidationError;

/// Success envelope returned to the caller.
#[derive(Debug, Serialize)]
pub struct FetchEnvelope {
    /// Raw fetched body text. The caller does its own post-processing.
    pub html: String,
    /// The URL the caller submitted, echoed verbatim.
    #[serde(rename = "fetchedUrl")]
    pub fetched_url: String,
}

impl From<FetchResult> for FetchEnvelope {
    fn from(result: FetchResult) -> Self {
        Self {
            html: result.body,
            fetched_url: result.requested_url,
        }
    }
}

/// Error envelope returned to the caller.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Every way a request can fail, across all stages.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request body did not contain a usable url")]
    BadRequest,
    #[error("client exceeded the request rate limit")]
    RateLimited,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl GatewayError {
    /// HTTP status for this outcome.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest => StatusCode::BAD_REQUEST,
            GatewayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Fetch(FetchError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Fetch(FetchError::UpstreamStatus { status, .. }) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            GatewayError::Fetch(FetchError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Fetch(FetchError::Network(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message for this outcome.
    pub fn message(&self) -> String {
        match self {
            GatewayError::BadRequest => "URL is required".to_string(),
            GatewayError::RateLimited => {
                "Rate limit exceeded. Please try again later.".to_string()
            }
            GatewayError::Validation(reason) => reason.to_string(),
            GatewayError::Fetch(FetchError::Timeout) => {
                "Request timeout - the webpage took too long to respond".to_string()
            }
            GatewayError::Fetch(FetchError::UpstreamStatus { status_text, .. }) => {
                format!("Failed to fetch URL: {}", status_text)
            }
            GatewayError::Fetch(FetchError::TooLarge { .. }) => {
                "Response too large (max 5MB)".to_string()
            }
            GatewayError::Fetch(FetchError::Network(_)) => {
                "An unexpected error occurred while processing your request".to_string()
            }
        }
    }

    /// Short label for metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            GatewayError::BadRequest => "bad_request",
            GatewayError::RateLimited => "rate_limited",
            GatewayError::Validation(_) => "validation_rejected",
            GatewayError::Fetch(err) => err.as_label(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn bad_request_maps_to_400() {
        let response = GatewayError::BadRequest.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "URL is required");
    }

    #[tokio::test]
    async fn rate_limited_maps_to_429() {
        let response = GatewayError::RateLimited.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            body_json(response).await["error"],
            "Rate limit exceeded. Please try again later."
        );
    }

    #[tokio::test]
    async fn validation_reason_is_echoed() {
        let response = GatewayError::from(ValidationError::SchemeNotAllowed).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            "Only HTTP and HTTPS protocols are allowed"
        );
    }

    #[tokio::test]
    async fn timeout_maps_to_504() {
        let response = GatewayError::from(FetchError::Timeout).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            body_json(response).await["error"],
            "Request timeout - the webpage took too long to respond"
        );
    }

    #[tokio::test]
    async fn upstream_status_is_mirrored() {
        let err = GatewayError::from(FetchError::UpstreamStatus {
            status: 404,
            status_text: "Not Found".into(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await["error"],
            "Failed to fetch URL: Not Found"
        );
    }

    #[tokio::test]
    async fn unrepresentable_upstream_status_falls_back_to_502() {
        let err = GatewayError::from(FetchError::UpstreamStatus {
            status: 42,
            status_text: "Unknown Status".into(),
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn too_large_maps_to_413() {
        let err = GatewayError::from(FetchError::TooLarge {
            max_bytes: 5 * 1024 * 1024,
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            body_json(response).await["error"],
            "Response too large (max 5MB)"
        );
    }

    #[tokio::test]
    async fn success_envelope_serializes_with_contract_field_names() {
        let envelope = FetchEnvelope {
            html: "<p>hi</p>".into(),
            fetched_url: "https://example.com/".into(),
        };
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["html"], "<p>hi</p>");
        assert_eq!(value["fetchedUrl"], "https://example.com/");
    }
}
