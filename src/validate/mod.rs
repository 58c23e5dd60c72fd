//! Target-URL validation.
//!
//! # Responsibilities
//! - Bound the length of caller-supplied URLs
//! - Reject anything that is not an absolute http/https URL
//! - Reject hostnames that name loopback, private, or link-local ranges
//!
//! # Design Decisions
//! - Checks run in a fixed order and stop at the first failure
//! - The internal-address filter is lexical: it inspects the hostname
//!   string, never a resolved IP. A hostname that resolves to a private
//!   address at connect time passes this filter (known residual risk).
//! - Rejection messages are part of the HTTP contract and must not drift

use url::{Host, Url};

/// Maximum accepted URL length, in characters.
pub const MAX_URL_CHARS: usize = 500;

/// Why a candidate URL was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("URL too long (max 500 characters)")]
    TooLong,
    #[error("Invalid URL format")]
    Malformed,
    #[error("Only HTTP and HTTPS protocols are allowed")]
    SchemeNotAllowed,
    #[error("Access to internal addresses is not allowed")]
    InternalAddress,
}

impl ValidationError {
    /// Short label for metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ValidationError::TooLong => "too_long",
            ValidationError::Malformed => "malformed",
            ValidationError::SchemeNotAllowed => "scheme",
            ValidationError::InternalAddress => "internal_address",
        }
    }
}

/// Validate a caller-supplied URL and return the parsed form.
///
/// `block_internal` gates the internal-address filter; it is on in any
/// production configuration and exists so test deployments can target
/// loopback upstreams.
pub fn validate_url(raw: &str, block_internal: bool) -> Result<Url, ValidationError> {
    if raw.chars().count() > MAX_URL_CHARS {
        return Err(ValidationError::TooLong);
    }

    let url = Url::parse(raw).map_err(|_| ValidationError::Malformed)?;

    // The url crate lowercases schemes during parsing, so an exact
    // comparison covers the case-insensitive requirement.
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ValidationError::SchemeNotAllowed);
    }

    let host = match url.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        None => return Err(ValidationError::Malformed),
    };

    if block_internal && is_internal_host(&host) {
        return Err(ValidationError::InternalAddress);
    }

    Ok(url)
}

/// Lexical filter for hostnames that name internal infrastructure.
///
/// Expects the unbracketed hostname as parsed out of the URL. IPv6
/// addresses arrive in the url crate's canonical lowercase form.
fn is_internal_host(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    if host == "0.0.0.0" || host == "::1" {
        return true;
    }
    if host.starts_with("127.")
        || host.starts_with("10.")
        || host.starts_with("192.168.")
        || host.starts_with("169.254.")
    {
        return true;
    }
    // 172.16.0.0/12 expressed lexically: second octet 16 through 31.
    if let Some(rest) = host.strip_prefix("172.") {
        if let Some((octet, _)) = rest.split_once('.') {
            if let Ok(n) = octet.parse::<u8>() {
                if (16..=31).contains(&n) {
                    return true;
                }
            }
        }
    }
    let lower = host.to_ascii_lowercase();
    lower.starts_with("fe80:") || lower.starts_with("fc00:")
}
