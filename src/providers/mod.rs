//! Threat-intelligence source adapters.
//!
//! Each adapter wraps exactly one external provider. The shared contract is
//! `fetch(ip) -> Option<Report>`: one attempt, fixed timeout, and every
//! transport, status or parse error is logged and collapses to `None` so the
//! aggregator can degrade instead of failing.

pub mod abuseipdb;
pub mod ipapi;
pub mod ipqualityscore;
pub mod virustotal;

use std::time::Duration;

/// Wall-clock timeout for every outbound provider call. Not configurable,
/// not retried.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_millis(5000);

/// Error from a single provider call. Swallowed inside the adapter; callers
/// only ever see `None`.
#[derive(Debug)]
pub(crate) enum FetchError {
    /// HTTP request failed.
    Http(reqwest::Error),
    /// Timeout.
    Timeout,
    /// Non-success HTTP status.
    Status(reqwest::StatusCode),
    /// Upstream declared failure in the response body.
    Upstream(String),
    /// Response body did not parse into the expected shape.
    InvalidResponse(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Http(e) => write!(f, "HTTP error: {}", e),
            FetchError::Timeout => write!(f, "Request timed out"),
            FetchError::Status(status) => write!(f, "HTTP {}", status),
            FetchError::Upstream(msg) => write!(f, "Upstream failure: {}", msg),
            FetchError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Http(e)
        }
    }
}
