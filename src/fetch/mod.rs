//! Outbound fetch execution.
//!
//! # Responsibilities
//! - Issue exactly one GET per admitted request
//! - Enforce the wall-clock deadline over connect, headers, and body
//! - Enforce the response-size cap before and during the body read
//! - Classify every failure into a closed set of tags
//!
//! # Design Decisions
//! - The deadline wraps the whole fetch future; on expiry the future is
//!   dropped, which closes the connection and frees the partial body
//! - The request is fresh and unauthenticated: no caller headers or
//!   cookies are ever forwarded upstream
//! - A truncated body is an error, never a silently shortened success

use std::time::Duration;

use futures_util::StreamExt;
use url::Url;

use crate::config::FetchConfig;

/// How an outbound fetch failed.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("upstream did not complete within the deadline")]
    Timeout,
    #[error("upstream returned {status} {status_text}")]
    UpstreamStatus { status: u16, status_text: String },
    #[error("response body exceeded {max_bytes} bytes")]
    TooLarge { max_bytes: u64 },
    #[error("network failure: {0}")]
    Network(reqwest::Error),
}

impl FetchError {
    /// Short label for metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            FetchError::Timeout => "timeout",
            FetchError::UpstreamStatus { .. } => "upstream_error",
            FetchError::TooLarge { .. } => "too_large",
            FetchError::Network(_) => "network_error",
        }
    }
}

/// Successful fetch payload.
#[derive(Debug)]
pub struct FetchResult {
    /// Response body decoded as text.
    pub body: String,
    /// The URL the caller asked for, echoed verbatim. Redirects may have
    /// been followed in transit; the echoed value is still the original.
    pub requested_url: String,
}

/// Issues bounded outbound GET requests.
///
/// One executor is built at startup and shared by every request; the
/// underlying client pools connections internally.
pub struct FetchExecutor {
    client: reqwest::Client,
    timeout: Duration,
    max_body_bytes: u64,
}

impl FetchExecutor {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects as usize))
            .build()?;

        Ok(Self {
            client,
            timeout: Duration::from_secs(config.timeout_secs),
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// Fetch `target`, which must already have passed validation.
    ///
    /// `requested` is the caller's original URL string, echoed back in the
    /// result untouched by parsing or redirect normalization.
    pub async fn fetch(&self, target: &Url, requested: &str) -> Result<FetchResult, FetchError> {
        match tokio::time::timeout(self.timeout, self.fetch_inner(target, requested)).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => Err(FetchError::Timeout),
        }
    }

    async fn fetch_inner(&self, target: &Url, requested: &str) -> Result<FetchResult, FetchError> {
        let response = self
            .client
            .get(target.clone())
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UpstreamStatus {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown Status").to_string(),
            });
        }

        // Reject on the declared length before touching the body at all.
        if let Some(declared) = response.content_length() {
            if declared > self.max_body_bytes {
                return Err(FetchError::TooLarge {
                    max_bytes: self.max_body_bytes,
                });
            }
        }

        // No declared length (or a lying one): cap the read itself.
        let mut body: Vec<u8> = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(classify_transport_error)?;
            if body.len() as u64 + chunk.len() as u64 > self.max_body_bytes {
                return Err(FetchError::TooLarge {
                    max_bytes: self.max_body_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(FetchResult {
            body: String::from_utf8_lossy(&body).into_owned(),
            requested_url: requested.to_string(),
        })
    }
}

/// Map a transport-level error to a fetch tag.
///
/// DNS failures, refused connections, and TLS faults all land in
/// `Network`; client-side deadline errors fold into `Timeout` for a
/// single client-facing category.
fn classify_transport_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(err)
    }
}
