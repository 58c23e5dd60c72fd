//! Client identification for rate limiting.
//!
//! The gateway sits behind an edge proxy, so the peer address of the TCP
//! connection is useless for telling callers apart. The best available
//! signal is the forwarding headers, taken as-is: the key is never
//! authenticated and only feeds the rate limiter.

use axum::http::HeaderMap;

/// Bucket shared by every caller whose address cannot be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Extract a best-effort client key from forwarding headers.
///
/// Prefers the first (client-most) entry of `x-forwarded-for`, then
/// `x-real-ip`, and falls back to [`UNKNOWN_CLIENT`]. Callers behind the
/// same unidentified proxy therefore share one bucket.
pub fn client_key(headers: &HeaderMap) -> String {
    if let Some(chain) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(ip) = chain.split(',').map(str::trim).find(|entry| !entry.is_empty()) {
            return ip.to_string();
        }
    }

    if let Some(ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let ip = ip.trim();
        if !ip.is_empty() {
            return ip.to_string();
        }
    }

    UNKNOWN_CLIENT.to_string()
}
